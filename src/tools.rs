//! MCP tools exposed by the server.
//!
//! - `select`: run a single read-only SELECT statement
//! - `schema`: describe tables, columns and foreign keys

mod select;

pub use select::guarded_select;

use crate::database::SchemaFilter;
use crate::error::log_error;
use crate::server::MysqlMcpServer;
use mcpkit::prelude::*;
use tracing::{debug, info, warn};

/// MCP server implementation containing the tools.
///
/// The `#[mcp_server]` macro generates the MCP protocol infrastructure for
/// every `#[tool]` annotated method.
#[mcp_server(
    name = "MySQL-MCP",
    version = "0.1.0",
    instructions = "Read-only access to a MySQL database. Use `schema` to discover tables and `select` to query them."
)]
impl MysqlMcpServer {
    /// Execute a SELECT query and return the rows as JSON.
    ///
    /// Anything other than a single read-only SELECT is refused before it
    /// reaches the database.
    #[tool(description = "Execute a SELECT SQL query on the MySQL database and return the results. Only SELECT queries are allowed for security reasons.")]
    pub async fn select(&self, query: String) -> Result<ToolOutput, McpError> {
        let result = match guarded_select(&self.guard, self.executor.as_ref(), &query).await {
            Ok(r) => r,
            Err(e) => return Ok(ToolOutput::error(e.to_string())),
        };

        if result.truncated {
            warn!(
                "Result truncated to {} rows",
                self.config.query.max_result_rows
            );
        }
        info!(
            "Query returned {} rows in {} ms",
            result.rows.len(),
            result.execution_time_ms
        );

        match result.rows_json() {
            Ok(json) => Ok(ToolOutput::text(json)),
            Err(e) => {
                log_error(&e);
                Ok(ToolOutput::error(e.to_string()))
            }
        }
    }

    /// Describe the database schema.
    #[tool(description = "Get schema information for the MySQL database: tables, columns and foreign key relationships. Optionally filter by exact table name or by a keyword contained in table names.")]
    pub async fn schema(
        &self,
        table_name: Option<String>,
        keyword: Option<String>,
    ) -> Result<ToolOutput, McpError> {
        let filter = SchemaFilter {
            table_name,
            keyword,
        };
        debug!("Describing schema with filter {:?}", filter);

        let output = match self.metadata.describe_schema(&filter).await {
            Ok(o) => o,
            Err(e) => {
                log_error(&e);
                return Ok(ToolOutput::error(e.to_string()));
            }
        };

        match serde_json::to_string_pretty(&output) {
            Ok(json) => Ok(ToolOutput::text(json)),
            Err(e) => {
                warn!("Failed to serialize schema to JSON: {}", e);
                Ok(ToolOutput::error(format!("Failed to serialize result: {}", e)))
            }
        }
    }
}
