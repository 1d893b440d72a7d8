//! Connection pool management for MySQL.

use crate::config::DatabaseConfig;
use crate::error::ServerError;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

/// Type alias for the connection pool.
pub type ConnectionPool = MySqlPool;

/// Build connect options from configuration.
pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.database);

    if config.password.is_empty() {
        options
    } else {
        options.password(&config.password)
    }
}

/// Create a connection pool from configuration.
///
/// Opens one connection up front so that bad credentials fail at startup
/// rather than on the first tool call.
pub async fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, ServerError> {
    info!(
        "Creating connection pool for {}:{} (max: {})",
        config.host, config.port, config.pool.max_connections
    );

    let pool = MySqlPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .acquire_timeout(config.pool.connection_timeout)
        .connect_with(connect_options(config))
        .await
        .map_err(|e| {
            ServerError::connection_with_source(
                format!("Failed to connect to MySQL database: {}", e),
                e,
            )
        })?;

    debug!("Initial connection test successful");
    info!(
        "Connected to MySQL database: {} at {}:{}",
        config.database, config.host, config.port
    );
    Ok(pool)
}

/// Close every pooled connection and wait for them to finish.
pub async fn close_pool(pool: &ConnectionPool) {
    if pool.is_closed() {
        return;
    }
    pool.close().await;
    info!("Disconnected from MySQL database");
}
