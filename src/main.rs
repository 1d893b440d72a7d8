//! MySQL MCP Server entry point.
//!
//! Serves MCP over stdio for Claude Desktop, Cursor and other MCP clients.
//! Only stderr is used for diagnostics; stdout carries JSON-RPC.

use anyhow::Result;
use mcpkit::prelude::*;
use mcpkit::transport::stdio::StdioTransport;
use mysql_mcp_server::constants::SERVER_NAME;
use mysql_mcp_server::shutdown::{install_signal_handlers, new_shutdown_controller};
use mysql_mcp_server::{Config, MysqlMcpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    eprintln!("{SERVER_NAME} server v{version} starting...");
    eprintln!("Transport: stdio");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] {}", info);
    }));

    let config = Config::from_env().inspect_err(|e| error!("{}", e))?;
    config.validate().inspect_err(|e| error!("{}", e))?;

    let shutdown_controller = new_shutdown_controller();
    install_signal_handlers(shutdown_controller.clone()).await;

    let server = MysqlMcpServer::new(config)
        .await
        .inspect_err(|e| error!("Database connection error: {}", e))?;
    let pool = server.pool().clone();

    let mcp = ServerBuilder::new(server.clone())
        .with_tools(server)
        .build();

    info!(r#"MySQL MCP server is running. Use the "select" tool to execute SQL queries."#);

    let mut shutdown_signal = shutdown_controller.signal();
    tokio::select! {
        served = mcp.serve(StdioTransport::new()) => {
            match served {
                Ok(()) => info!("Client disconnected"),
                Err(e) => error!("Service error: {}", e),
            }
        }
        _ = shutdown_signal.recv() => {
            info!("Shutdown signal received");
        }
    }

    shutdown_controller.graceful_shutdown(&pool).await;
    eprintln!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,mysql_mcp_server=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
