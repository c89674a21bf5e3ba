//! Daemon entry point for the genome MCP server.
//!
//! Loads configuration from the CLI and environment, builds the rate-limited
//! control plane, and serves the MCP protocol over stdio and/or streamable HTTP.

mod config;
mod control;

use std::sync::Arc;

use genome_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::GenomeConfig;
use crate::control::build_control_plane;

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_new(level).map_err(|err| format!("invalid log level '{level}': {err}"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GenomeConfig::from_args()?;
    init_tracing(&config.log_level)?;

    let control = Arc::new(build_control_plane(&config)?);

    let http = config.mcp_serve.then(|| {
        let control = control.clone();
        let http_config = McpHttpServerConfig::new(config.mcp_http_addr);
        tokio::spawn(async move { serve_streamable_http(control, http_config).await })
    });

    if config.enable_stdio {
        serve_stdio(control).await.map_err(|err| err as Box<dyn std::error::Error>)?;
        info!("stdio session closed");
    } else if let Some(http) = http {
        http.await?.map_err(|err| err as Box<dyn std::error::Error>)?;
    }
    Ok(())
}
