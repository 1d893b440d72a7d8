//! Integration tests for the MySQL MCP Server.
//!
//! These tests support two modes:
//! 1. **Testcontainers** (default): Automatically spins up a MySQL container
//! 2. **External server**: Connect to an existing server via MYSQL_HOST env var
//!
//! ## Running with testcontainers (requires Docker):
//! ```bash
//! cargo test --test integration_tests -- --ignored --test-threads=1
//! ```
//!
//! ## Running against external server (e.g., CI service container):
//! ```bash
//! MYSQL_HOST=127.0.0.1 MYSQL_PORT=3306 MYSQL_USER=root MYSQL_PASSWORD='pass' \
//!   MYSQL_DATABASE=test cargo test --test integration_tests -- --ignored --test-threads=1
//! ```
//!
//! Every test recreates its fixtures, so an external database named in
//! MYSQL_DATABASE will have `it_users` and `it_orders` dropped and rebuilt.

use mysql_mcp_server::database::{
    connect_options, create_pool, ConnectionPool, MetadataQueries, QueryExecutor, SchemaFilter,
    SqlValue,
};
use mysql_mcp_server::tools::guarded_select;
use mysql_mcp_server::{Config, QueryGuard, Rejection, ServerError};
use serial_test::serial;
use sqlx::mysql::MySqlPoolOptions;
use std::collections::HashMap;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mysql::Mysql;

/// Check if we should use an external server (vs testcontainers).
fn use_external_server() -> bool {
    std::env::var("MYSQL_HOST").is_ok()
}

/// Test database connection source.
#[allow(dead_code)] // Variants held for lifetime management (Drop trait)
enum TestDatabaseSource {
    External,
    Container(Box<ContainerAsync<Mysql>>),
}

/// Helper struct to manage the test database.
struct TestDatabase {
    #[allow(dead_code)] // Held for lifetime management (Drop trait on Container)
    source: TestDatabaseSource,
    config: Config,
}

impl TestDatabase {
    /// Uses an external server if MYSQL_HOST is set, otherwise testcontainers.
    async fn new() -> Self {
        if use_external_server() {
            Self::from_external()
        } else {
            Self::from_testcontainer().await
        }
    }

    fn from_external() -> Self {
        let config = Config::from_env().expect("invalid MYSQL_* environment");
        eprintln!(
            "Using external MySQL at {}:{}",
            config.database.host, config.database.port
        );
        Self {
            source: TestDatabaseSource::External,
            config,
        }
    }

    async fn from_testcontainer() -> Self {
        eprintln!("Starting MySQL container via testcontainers...");

        let container = Mysql::default()
            .start()
            .await
            .unwrap_or_else(|e| panic!("Failed to start MySQL container: {}", e));

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(3306)
            .await
            .expect("Failed to get port");

        eprintln!("MySQL container ready at {}:{}", host, port);

        // The module image runs as root with an empty password and a `test` database.
        let vars: HashMap<&str, String> = [
            ("MYSQL_HOST", host.to_string()),
            ("MYSQL_PORT", port.to_string()),
            ("MYSQL_MAX_ROWS", "100".to_string()),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("config");

        Self {
            source: TestDatabaseSource::Container(Box::new(container)),
            config,
        }
    }

    /// Pool used for fixtures; never passes through the query gate.
    async fn admin_pool(&self) -> ConnectionPool {
        MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options(&self.config.database))
            .await
            .expect("Failed to connect to MySQL")
    }

    async fn seed(&self) {
        let pool = self.admin_pool().await;
        let statements = [
            "DROP TABLE IF EXISTS it_orders",
            "DROP TABLE IF EXISTS it_users",
            "CREATE TABLE it_users (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(200) NULL,
                action VARCHAR(20) NULL,
                balance DECIMAL(10,2) NOT NULL DEFAULT 0
            )",
            "CREATE TABLE it_orders (
                id INT AUTO_INCREMENT PRIMARY KEY,
                user_id INT NOT NULL,
                total DECIMAL(10,2) NOT NULL,
                CONSTRAINT fk_it_orders_user FOREIGN KEY (user_id) REFERENCES it_users(id)
            )",
            "INSERT INTO it_users (name, email, action, balance) VALUES
                ('Alice', 'alice@example.com', 'create', 100.50),
                ('Bob', NULL, 'read', 0),
                ('Charlie', 'charlie@example.com', NULL, 12.00)",
            "INSERT INTO it_orders (user_id, total) VALUES (1, 10.00), (1, 5.25), (2, 7.50)",
        ];
        for sql in statements {
            sqlx::query(sql)
                .execute(&pool)
                .await
                .unwrap_or_else(|e| panic!("fixture failed: {}: {}", sql, e));
        }
        pool.close().await;
    }

    async fn pool(&self) -> ConnectionPool {
        create_pool(&self.config.database)
            .await
            .expect("create_pool failed")
    }

    async fn executor(&self) -> QueryExecutor {
        QueryExecutor::new(
            self.pool().await,
            self.config.query.max_result_rows,
            self.config.query.timeout,
        )
    }
}

// =============================================================================
// Select Tests
// =============================================================================

mod select_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_select_returns_rows_in_column_order() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let executor = db.executor().await;

        let result = guarded_select(
            &QueryGuard::new(),
            &executor,
            "SELECT id, name, email FROM it_users ORDER BY id",
        )
        .await
        .expect("select failed");

        assert_eq!(result.rows.len(), 3);
        assert!(!result.truncated);
        assert_eq!(
            result.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["id", "name", "email"]
        );
        assert_eq!(
            result.rows[0].get("name"),
            Some(&SqlValue::String("Alice".to_string()))
        );
        assert_eq!(result.rows[1].get("email"), Some(&SqlValue::Null));

        let json: serde_json::Value = serde_json::from_str(&result.rows_json().unwrap()).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["email"], "alice@example.com");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_keyword_inside_literal_is_accepted() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let executor = db.executor().await;

        let result = guarded_select(
            &QueryGuard::new(),
            &executor,
            "SELECT name FROM it_users WHERE action = 'create'",
        )
        .await
        .expect("select failed");

        assert_eq!(result.rows.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_rejected_statements_leave_data_intact() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let executor = db.executor().await;
        let guard = QueryGuard::new();

        let attempts = [
            ("DELETE FROM it_users", Rejection::InvalidStatementType),
            (
                "SELECT * FROM it_users; DROP TABLE it_users",
                Rejection::MultipleStatements,
            ),
            (
                "SELECT * FROM it_users WHERE name = 'x' OR 1=1",
                Rejection::SuspiciousPattern,
            ),
        ];
        for (sql, expected) in attempts {
            match guarded_select(&guard, &executor, sql).await {
                Err(ServerError::Rejected(r)) => assert_eq!(r, expected, "{sql}"),
                other => panic!("expected rejection for {sql}, got {:?}", other.map(|r| r.rows.len())),
            }
        }

        let result = guarded_select(&guard, &executor, "SELECT COUNT(*) AS n FROM it_users")
            .await
            .expect("count failed");
        assert_eq!(result.rows[0].get("n"), Some(&SqlValue::I64(3)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_missing_table_reports_driver_message() {
        let db = TestDatabase::new().await;
        let executor = db.executor().await;

        let err = guarded_select(
            &QueryGuard::new(),
            &executor,
            "SELECT * FROM nonexistent_table",
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Failed to execute query: "), "{message}");
        assert!(message.contains("nonexistent_table"), "{message}");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_row_cap_truncates() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let executor = QueryExecutor::new(db.pool().await, 2, Duration::from_secs(30));

        let result = executor
            .execute("SELECT id FROM it_users ORDER BY id")
            .await
            .expect("select failed");

        assert_eq!(result.rows.len(), 2);
        assert!(result.truncated);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_value_mapping() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let executor = db.executor().await;

        let result = executor
            .execute(
                "SELECT balance, CAST(1 AS UNSIGNED) AS u, DATE('2023-01-01') AS d, \
                 JSON_OBJECT('a', 1) AS j, NULL AS n FROM it_users WHERE id = 1",
            )
            .await
            .expect("select failed");

        let json: serde_json::Value = serde_json::from_str(&result.rows_json().unwrap()).unwrap();
        assert_eq!(json[0]["balance"], "100.50");
        assert_eq!(json[0]["u"], 1);
        assert_eq!(json[0]["d"], "2023-01-01");
        assert_eq!(json[0]["j"], serde_json::json!({"a": 1}));
        assert!(json[0]["n"].is_null());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_closed_pool_reports_not_connected() {
        let db = TestDatabase::new().await;
        let pool = db.pool().await;
        let executor = QueryExecutor::new(pool.clone(), 10, Duration::from_secs(5));
        pool.close().await;

        let err = executor.execute("SELECT 1").await.unwrap_err();
        assert_eq!(err.to_string(), "Database is not connected");
    }
}

// =============================================================================
// Schema Tests
// =============================================================================

mod schema_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_describe_single_table() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let metadata = MetadataQueries::new(db.pool().await);

        let output = metadata
            .describe_schema(&SchemaFilter {
                table_name: Some("it_users".to_string()),
                keyword: None,
            })
            .await
            .expect("describe failed");

        assert_eq!(output.tables.len(), 1);
        let table = &output.tables[0];
        assert_eq!(table.table_name, "it_users");

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "email", "action", "balance"]);

        let id = &table.columns[0];
        assert_eq!(id.data_type, "int");
        assert!(!id.nullable);
        assert_eq!(id.key.as_deref(), Some("PRI"));
        assert_eq!(id.extra.as_deref(), Some("auto_increment"));

        assert!(table.columns[2].nullable);
        assert_eq!(table.columns[2].key, None);

        assert_eq!(output.relationships.len(), 1);
        assert_eq!(output.relationships[0].table, "it_orders");
        assert_eq!(output.relationships[0].referenced_table, "it_users");
        assert_eq!(output.relationships[0].constraint_name, "fk_it_orders_user");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_keyword_filter() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let metadata = MetadataQueries::new(db.pool().await);

        let output = metadata
            .describe_schema(&SchemaFilter {
                table_name: None,
                keyword: Some("it_ord".to_string()),
            })
            .await
            .expect("describe failed");

        let names: Vec<&str> = output.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["it_orders"]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    #[serial]
    async fn test_filter_is_bound_not_interpolated() {
        let db = TestDatabase::new().await;
        db.seed().await;
        let metadata = MetadataQueries::new(db.pool().await);

        let output = metadata
            .describe_schema(&SchemaFilter {
                table_name: Some("it_users' OR '1'='1".to_string()),
                keyword: None,
            })
            .await
            .expect("describe failed");

        assert!(output.tables.is_empty());
        assert!(output.relationships.is_empty());
    }
}
