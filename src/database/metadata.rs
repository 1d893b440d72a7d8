//! Schema introspection through INFORMATION_SCHEMA.
//!
//! Filters supplied by the caller are always bound as parameters. String
//! columns are cast to CHAR because MySQL 8 reports several
//! INFORMATION_SCHEMA columns with binary collations.

use crate::database::ConnectionPool;
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{QueryBuilder, Row};
use tracing::debug;

/// Optional narrowing of a schema description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFilter {
    /// Exact table name.
    pub table_name: Option<String>,

    /// Substring matched against table names.
    pub keyword: Option<String>,
}

impl SchemaFilter {
    fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref().filter(|s| !s.is_empty())
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().filter(|s| !s.is_empty())
    }
}

/// Tables, columns and foreign keys of the current database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaOutput {
    pub tables: Vec<TableSchema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

/// One table and its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    pub nullable: bool,

    /// PRI, UNI, MUL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// auto_increment and similar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// A foreign key between two tables of the current database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub constraint_name: String,
}

/// Metadata query builder.
pub struct MetadataQueries {
    pool: ConnectionPool,
}

impl MetadataQueries {
    /// Create a new metadata query builder.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Describe tables, columns and relationships matching `filter`.
    pub async fn describe_schema(&self, filter: &SchemaFilter) -> Result<SchemaOutput, ServerError> {
        if self.pool.is_closed() {
            return Err(ServerError::NotConnected);
        }

        let table_names = self.list_tables(filter).await?;
        debug!("Describing {} table(s)", table_names.len());

        let mut tables = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            let columns = self.table_columns(&table_name).await?;
            tables.push(TableSchema {
                table_name,
                columns,
            });
        }

        let relationships = self.relationships(filter).await?;

        Ok(SchemaOutput {
            tables,
            relationships,
        })
    }

    async fn list_tables(&self, filter: &SchemaFilter) -> Result<Vec<String>, ServerError> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT CAST(TABLE_NAME AS CHAR) AS table_name \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE()",
        );
        if let Some(keyword) = filter.keyword() {
            qb.push(" AND TABLE_NAME LIKE CONCAT('%', ")
                .push_bind(keyword)
                .push(", '%')");
        }
        if let Some(table) = filter.table_name() {
            qb.push(" AND TABLE_NAME = ").push_bind(table);
        }
        qb.push(" ORDER BY TABLE_NAME");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("table_name").map_err(ServerError::from))
            .collect()
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnSchema>, ServerError> {
        let rows = sqlx::query::<MySql>(
            "SELECT \
                CAST(COLUMN_NAME AS CHAR) AS name, \
                CAST(DATA_TYPE AS CHAR) AS data_type, \
                CAST(IS_NULLABLE AS CHAR) AS nullable, \
                CAST(COLUMN_KEY AS CHAR) AS column_key, \
                CAST(COLUMN_DEFAULT AS CHAR) AS column_default, \
                CAST(EXTRA AS CHAR) AS extra \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(column_from_row).collect()
    }

    async fn relationships(&self, filter: &SchemaFilter) -> Result<Vec<Relationship>, ServerError> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT \
                CAST(TABLE_NAME AS CHAR) AS table_name, \
                CAST(COLUMN_NAME AS CHAR) AS column_name, \
                CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table, \
                CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column, \
                CAST(CONSTRAINT_NAME AS CHAR) AS constraint_name \
             FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = DATABASE() \
               AND REFERENCED_TABLE_SCHEMA = DATABASE() \
               AND REFERENCED_TABLE_NAME IS NOT NULL",
        );
        if let Some(table) = filter.table_name() {
            qb.push(" AND (TABLE_NAME = ")
                .push_bind(table)
                .push(" OR REFERENCED_TABLE_NAME = ")
                .push_bind(table)
                .push(")");
        }
        if let Some(keyword) = filter.keyword() {
            qb.push(" AND (TABLE_NAME LIKE CONCAT('%', ")
                .push_bind(keyword)
                .push(", '%') OR REFERENCED_TABLE_NAME LIKE CONCAT('%', ")
                .push_bind(keyword)
                .push(", '%'))");
        }
        qb.push(" ORDER BY TABLE_NAME, CONSTRAINT_NAME, ORDINAL_POSITION");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(relationship_from_row).collect()
    }
}

fn column_from_row(row: &MySqlRow) -> Result<ColumnSchema, ServerError> {
    let nullable: String = row.try_get("nullable")?;
    Ok(ColumnSchema {
        name: row.try_get("name")?,
        data_type: row.try_get("data_type")?,
        nullable: nullable == "YES",
        key: non_empty(row.try_get("column_key")?),
        default: row.try_get("column_default")?,
        extra: non_empty(row.try_get("extra")?),
    })
}

fn relationship_from_row(row: &MySqlRow) -> Result<Relationship, ServerError> {
    Ok(Relationship {
        table: row.try_get("table_name")?,
        column: row.try_get("column_name")?,
        referenced_table: row.try_get("referenced_table")?,
        referenced_column: row.try_get("referenced_column")?,
        constraint_name: row.try_get("constraint_name")?,
    })
}

/// MySQL reports "no key" and "no extra" as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
