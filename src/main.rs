//! MCP server binary entry point.

use anyhow::Result;
use mysql_introspect_mcp::{
    config::ServerConfig,
    introspect::Introspector,
    protocol::McpServer,
    server::{McpHandler, ServerStateBuilder},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = ServerConfig::builder().from_env().build();
    info!("Using config file {}", config.config_path.display());

    // Settings are resolved once here; a failure is reported on every tool call.
    let introspector = Arc::new(Introspector::mysql(&config));

    let state = Arc::new(
        ServerStateBuilder::new()
            .config(config)
            .introspector(introspector)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    );

    info!("Server state initialized with {} tools", state.tools.len());

    McpServer::new(McpHandler::new(state)).run().await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mysql_introspect_mcp=info,warn"));

    // JSON logs go to stderr; stdout carries the protocol
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
