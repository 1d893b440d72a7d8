//! # MySQL MCP Server
//!
//! A Model Context Protocol (MCP) server giving AI clients read-only access
//! to a MySQL database.
//!
//! This crate provides:
//! - **Tools**: `select` for single SELECT statements, `schema` for table
//!   and relationship discovery
//! - **Query gate**: a lexical filter that refuses anything other than one
//!   read-only SELECT before it reaches the database
//!
//! ## Architecture
//!
//! A tool call flows `tools` -> [`security::QueryGuard`] -> `database`.
//! The guard is pure; only admitted queries are executed, exactly as sent.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod security;
pub mod server;
pub mod shutdown;
pub mod tools;

pub use config::Config;
pub use error::{McpError, ServerError};
pub use security::{QueryGuard, Rejection};
pub use server::MysqlMcpServer;
