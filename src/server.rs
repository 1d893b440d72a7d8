//! MCP server struct definition and initialization.

use crate::config::Config;
use crate::database::{create_pool, ConnectionPool, MetadataQueries, QueryExecutor};
use crate::error::ServerError;
use crate::security::QueryGuard;
use std::sync::Arc;

/// The MySQL MCP Server instance.
///
/// Cloned into the transport; everything behind it is shared. The server
/// exposes two tools, `select` and `schema`, defined in [`crate::tools`].
#[derive(Clone)]
pub struct MysqlMcpServer {
    /// Database connection pool.
    pub(crate) pool: ConnectionPool,

    /// Configuration.
    pub(crate) config: Arc<Config>,

    /// Query executor.
    pub(crate) executor: Arc<QueryExecutor>,

    /// Schema introspection.
    pub(crate) metadata: Arc<MetadataQueries>,

    /// Read-only query gate.
    pub(crate) guard: QueryGuard,
}

impl MysqlMcpServer {
    /// Validate `config`, connect to MySQL and build the server.
    pub async fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;
        let pool = create_pool(&config.database).await?;
        Ok(Self::with_pool(config, pool))
    }

    /// Build the server around an existing pool.
    pub fn with_pool(config: Config, pool: ConnectionPool) -> Self {
        let executor = Arc::new(QueryExecutor::new(
            pool.clone(),
            config.query.max_result_rows,
            config.query.timeout,
        ));
        let metadata = Arc::new(MetadataQueries::new(pool.clone()));

        Self {
            pool,
            config: Arc::new(config),
            executor,
            metadata,
            guard: QueryGuard::new(),
        }
    }

    /// Create a server from environment variables.
    pub async fn from_env() -> Result<Self, ServerError> {
        let config = Config::from_env()?;
        Self::new(config).await
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Get a reference to the query executor.
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Get a reference to the metadata queries.
    pub fn metadata(&self) -> &MetadataQueries {
        &self.metadata
    }

    /// Get the query gate.
    pub fn guard(&self) -> QueryGuard {
        self.guard
    }
}
