//! Centralized constants for the MySQL MCP Server.
//!
//! Default values used throughout the codebase, kept in one place so they
//! are easy to find and change.

use std::time::Duration;

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default MySQL host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default MySQL port.
pub const DEFAULT_PORT: u16 = 3306;

/// Default MySQL user.
pub const DEFAULT_USER: &str = "root";

/// Default database name.
pub const DEFAULT_DATABASE: &str = "test";

// =============================================================================
// Timeout Constants
// =============================================================================

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout as Duration.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration =
    Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS);

/// Default query timeout as Duration.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS);

/// Time allowed for closing the pool during shutdown.
pub const SHUTDOWN_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Connection Pool Constants
// =============================================================================

/// Default maximum connections in pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Result Size Constants
// =============================================================================

/// Default maximum result rows.
pub const DEFAULT_MAX_RESULT_ROWS: usize = 10_000;

/// Maximum query length shown in log lines.
pub const LOG_QUERY_PREVIEW_LEN: usize = 200;

// =============================================================================
// Server Identity
// =============================================================================

/// Server name advertised over MCP.
pub const SERVER_NAME: &str = "MySQL-MCP";
