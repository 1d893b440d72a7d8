//! Configuration management for the MySQL MCP Server.
//!
//! Configuration is loaded from environment variables following the 12-factor app pattern.

use crate::constants::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_DATABASE, DEFAULT_HOST,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_RESULT_ROWS, DEFAULT_PORT, DEFAULT_QUERY_TIMEOUT,
    DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_USER,
};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Query execution configuration
    pub query: QueryConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MySQL hostname or IP address
    pub host: String,

    /// MySQL port (default: 3306)
    pub port: u16,

    /// Login user
    pub user: String,

    /// Login password (may be empty)
    #[serde(skip_serializing)]
    pub password: String,

    /// Database to connect to
    pub database: String,

    /// Connection pool configuration
    pub pool: PoolConfig,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout
    pub connection_timeout: Duration,
}

/// Query execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Per-query timeout
    pub timeout: Duration,

    /// Maximum result rows per query
    pub max_result_rows: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MYSQL_HOST`: hostname (default: localhost)
    /// - `MYSQL_PORT`: port number (default: 3306)
    /// - `MYSQL_USER`: user (default: root)
    /// - `MYSQL_PASSWORD`: password (default: empty)
    /// - `MYSQL_DATABASE`: database name (default: test)
    /// - `MYSQL_POOL_MAX`: maximum pool connections (default: 5)
    /// - `MYSQL_CONNECT_TIMEOUT`: connection timeout in seconds (default: 30)
    /// - `MYSQL_QUERY_TIMEOUT`: query timeout in seconds (default: 30)
    /// - `MYSQL_MAX_ROWS`: maximum result rows (default: 10000)
    ///
    /// Empty values count as unset.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = var("MYSQL_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("MYSQL_PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| ServerError::config("MYSQL_PORT is not a valid number"))?,
            None => DEFAULT_PORT,
        };

        let user = var("MYSQL_USER").unwrap_or_else(|| DEFAULT_USER.to_string());
        let password = var("MYSQL_PASSWORD").unwrap_or_default();
        let database = var("MYSQL_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let max_connections = var("MYSQL_POOL_MAX")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let connection_timeout_secs = var("MYSQL_CONNECT_TIMEOUT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS);

        let query_timeout_secs = var("MYSQL_QUERY_TIMEOUT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);

        let max_result_rows = var("MYSQL_MAX_ROWS")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_MAX_RESULT_ROWS);

        Ok(Config {
            database: DatabaseConfig {
                host,
                port,
                user,
                password,
                database,
                pool: PoolConfig {
                    max_connections,
                    connection_timeout: Duration::from_secs(connection_timeout_secs),
                },
            },
            query: QueryConfig {
                timeout: Duration::from_secs(query_timeout_secs),
                max_result_rows,
            },
        })
    }

    /// Check that the settings needed to connect are present.
    pub fn validate(&self) -> Result<(), ServerError> {
        let db = &self.database;
        if db.host.is_empty() {
            return Err(ServerError::config("MYSQL_HOST is not set"));
        }
        if db.port == 0 {
            return Err(ServerError::config("MYSQL_PORT is not a valid number"));
        }
        if db.user.is_empty() {
            return Err(ServerError::config("MYSQL_USER is not set"));
        }
        if db.database.is_empty() {
            return Err(ServerError::config("MYSQL_DATABASE is not set"));
        }
        if db.pool.max_connections == 0 {
            return Err(ServerError::config("MYSQL_POOL_MAX must be positive"));
        }
        if self.query.max_result_rows == 0 {
            return Err(ServerError::config("MYSQL_MAX_ROWS must be positive"));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_QUERY_TIMEOUT,
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
        }
    }
}
