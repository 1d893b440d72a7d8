//! Database connectivity and query execution.

mod connection;
pub mod metadata;
mod query;
pub mod types;

pub use connection::{close_pool, connect_options, create_pool, ConnectionPool};
pub use metadata::{
    ColumnSchema, MetadataQueries, Relationship, SchemaFilter, SchemaOutput, TableSchema,
};
pub(crate) use query::truncate_for_log;
pub use query::{ColumnInfo, QueryExecutor, QueryResult, QueryRunner, ResultRow};
pub use types::{SqlValue, TypeMapper};
