//! Error types for the MySQL MCP Server.
//!
//! Query rejections from the gate and driver failures are kept apart: a
//! rejection means the query never ran, a driver error is passed through from
//! MySQL as-is.

pub use mcpkit::McpError;
use crate::security::Rejection;
use thiserror::Error;

/// Domain-specific errors for the MySQL MCP Server.
///
/// Named `ServerError` to avoid collision with `mcpkit::McpError`.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("{message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The pool was closed before the request arrived
    #[error("Database is not connected")]
    NotConnected,

    /// Query refused by the gate
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Query execution error reported by MySQL
    #[error("Failed to execute query: {message}")]
    QueryExecution {
        message: String,
        sql_error_code: Option<String>,
    },

    /// Query timeout
    #[error("Query timeout: operation exceeded {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a timeout error.
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout {
            timeout_seconds: seconds,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Category tag used when logging the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(_) | Self::NotConnected => "VALIDATION_ERROR",
            Self::Config(_) | Self::Connection { .. } => "DATABASE_CONNECTION_ERROR",
            Self::QueryExecution { .. } | Self::Timeout { .. } => "QUERY_EXECUTION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error is transient and may succeed on retry.
    ///
    /// Rejections are never transient: the same text is refused every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    /// Get a user-friendly suggestion for how to fix this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the MYSQL_* environment variables"),
            Self::Connection { .. } | Self::NotConnected => {
                Some("Check server hostname, port, credentials and network connectivity")
            }
            Self::Rejected(_) => Some("Rewrite the query as a single read-only SELECT statement"),
            Self::Timeout { .. } => Some("Try a simpler query or raise MYSQL_QUERY_TIMEOUT"),
            _ => None,
        }
    }
}

/// Log an error with its category tag.
///
/// Rejections are expected traffic and go out at `warn`; everything else is
/// logged at `error`.
pub fn log_error(err: &ServerError) {
    let line = log_line(err);
    match err {
        ServerError::Rejected(_) | ServerError::NotConnected => tracing::warn!("{}", line),
        _ => tracing::error!("{}", line),
    }
}

/// `[KIND] message`, with the server's SQL error code when there is one.
fn log_line(err: &ServerError) -> String {
    match err {
        ServerError::QueryExecution {
            sql_error_code: Some(code),
            ..
        } => format!("[{}] ({}) {}", err.kind(), code, err),
        _ => format!("[{}] {}", err.kind(), err),
    }
}

/// Convert ServerError to mcpkit's McpError for protocol responses.
///
/// Tool errors should return `ToolOutput::error()` with a message instead;
/// this is for protocol-level errors.
impl From<ServerError> for McpError {
    fn from(e: ServerError) -> Self {
        match e {
            ServerError::Rejected(rejection) => {
                McpError::invalid_params("query", rejection.to_string())
            }
            ServerError::Config(msg) => McpError::invalid_request(msg),
            other => McpError::internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ServerError {
    fn from(e: sqlx::Error) -> Self {
        use sqlx::Error;

        match e {
            Error::Database(db) => ServerError::QueryExecution {
                message: db.message().to_string(),
                sql_error_code: db.code().map(|c| c.into_owned()),
            },
            Error::Io(io) => ServerError::connection_with_source(format!("IO error: {}", io), io),
            Error::Tls(tls) => ServerError::Connection {
                message: format!("TLS error: {}", tls),
                source: Some(tls),
            },
            Error::Protocol(msg) => ServerError::connection(format!("Protocol error: {}", msg)),
            Error::PoolTimedOut => ServerError::connection("Timed out waiting for a connection"),
            Error::PoolClosed => ServerError::NotConnected,
            Error::Configuration(cfg) => ServerError::config(cfg.to_string()),
            Error::ColumnDecode { index, source } => ServerError::query_error(format!(
                "Failed to decode column {}: {}",
                index, source
            )),
            Error::RowNotFound => ServerError::query_error("No rows returned"),
            other => ServerError::internal(other.to_string()),
        }
    }
}
