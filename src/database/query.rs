//! Query execution and result handling.

use crate::constants::LOG_QUERY_PREVIEW_LEN;
use crate::database::types::{SqlValue, TypeMapper};
use crate::database::ConnectionPool;
use crate::error::ServerError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Column, Row, TypeInfo};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// A single row of query results.
///
/// Serializes as a JSON object whose keys follow the column order of the
/// result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    values: Vec<(String, SqlValue)>,
}

impl ResultRow {
    /// Create a new result row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Append a value.
    pub fn insert(&mut self, column: String, value: SqlValue) {
        self.values.push((column, value));
    }

    fn from_mysql(row: &MySqlRow, columns: &[ColumnInfo]) -> Self {
        let values = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name.clone(), TypeMapper::extract_column(row, idx)))
            .collect();
        Self { values }
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of a query execution.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column names in order.
    pub columns: Vec<ColumnInfo>,

    /// Result rows.
    pub rows: Vec<ResultRow>,

    /// Execution time in milliseconds.
    pub execution_time_ms: u64,

    /// Whether results were truncated due to row limit.
    pub truncated: bool,
}

/// Information about a result column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// MySQL type name.
    pub sql_type: String,
}

impl QueryResult {
    /// Create an empty query result.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            execution_time_ms: 0,
            truncated: false,
        }
    }

    /// Rows as a pretty-printed JSON array of objects.
    ///
    /// A statement that produced no result set renders as `[]`.
    pub fn rows_json(&self) -> Result<String, ServerError> {
        serde_json::to_string_pretty(&self.rows)
            .map_err(|e| ServerError::internal(format!("Failed to serialize result: {}", e)))
    }
}

/// The database side of the `select` tool: run a query string, get rows or a
/// driver error back.
pub trait QueryRunner: Send + Sync {
    /// Execute `query` exactly as given.
    fn execute_query(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<QueryResult, ServerError>> + Send;
}

/// Query executor for running SQL queries against the pool.
pub struct QueryExecutor {
    pool: ConnectionPool,
    max_rows: usize,
    timeout: Duration,
}

impl QueryExecutor {
    /// Create a new query executor.
    pub fn new(pool: ConnectionPool, max_rows: usize, timeout: Duration) -> Self {
        Self {
            pool,
            max_rows,
            timeout,
        }
    }

    /// Whether the underlying pool still accepts work.
    pub fn is_connected(&self) -> bool {
        !self.pool.is_closed()
    }

    /// Execute a query and return at most `max_rows` rows.
    pub async fn execute(&self, query: &str) -> Result<QueryResult, ServerError> {
        if !self.is_connected() {
            return Err(ServerError::NotConnected);
        }

        let start = Instant::now();
        debug!("Executing query: {}", truncate_for_log(query, LOG_QUERY_PREVIEW_LEN));

        let result = tokio::time::timeout(self.timeout, self.collect_rows(query, start))
            .await
            .map_err(|_| ServerError::timeout(self.timeout.as_secs()))??;

        debug!(
            "Query completed: {} rows in {} ms{}",
            result.rows.len(),
            result.execution_time_ms,
            if result.truncated { " (truncated)" } else { "" }
        );

        Ok(result)
    }

    async fn collect_rows(&self, query: &str, start: Instant) -> Result<QueryResult, ServerError> {
        use futures_util::stream::TryStreamExt;

        let mut stream = sqlx::query::<MySql>(query).fetch(&self.pool);

        let mut columns: Vec<ColumnInfo> = Vec::new();
        let mut rows: Vec<ResultRow> = Vec::new();
        let mut truncated = false;

        while let Some(row) = stream.try_next().await? {
            if columns.is_empty() {
                columns = describe_columns(&row);
            }
            if rows.len() >= self.max_rows {
                truncated = true;
                break;
            }
            rows.push(ResultRow::from_mysql(&row, &columns));
        }

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms: start.elapsed().as_millis() as u64,
            truncated,
        })
    }
}

impl QueryRunner for QueryExecutor {
    async fn execute_query(&self, query: &str) -> Result<QueryResult, ServerError> {
        self.execute(query).await
    }
}

fn describe_columns(row: &MySqlRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo {
            name: col.name().to_string(),
            sql_type: col.type_info().name().to_string(),
        })
        .collect()
}

/// Truncate a string for logging purposes.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
