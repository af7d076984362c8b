//! MCP server for read-only MySQL catalog introspection.
//!
//! Lists schemas, tables, columns, indexes, foreign keys and views from
//! `information_schema`, reshaped into nested records. Every call opens its
//! own connection and closes it before returning.
//!
//! # Example
//!
//! ```no_run
//! use mysql_introspect_mcp::{
//!     config::ServerConfig,
//!     introspect::Introspector,
//!     protocol::McpServer,
//!     server::{McpHandler, ServerStateBuilder},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Connection string comes from MYSQL_CONNECTION_STRING or the config file
//!     let config = ServerConfig::builder().from_env().build();
//!     let introspector = Arc::new(Introspector::mysql(&config));
//!
//!     let state = Arc::new(
//!         ServerStateBuilder::new()
//!             .config(config)
//!             .introspector(introspector)
//!             .build()
//!             .map_err(|e| anyhow::anyhow!(e))?
//!     );
//!
//!     McpServer::new(McpHandler::new(state)).run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod introspect;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{DatabaseConfig, DatabaseConfigBuilder, ServerConfig};
pub use database::{
    CatalogConnector, CatalogSession, Column, ConnectionStringParser, ForeignKey, Index,
    MySqlConnector, Schema, Table, TableType, View,
};
pub use error::{DatabaseError, ErrorKind, McpError, Result};
pub use introspect::Introspector;
pub use protocol::McpServer;
pub use server::{McpHandler, ServerState, ServerStateBuilder};
