//! topdesk-mcp - MCP server for TOPdesk
//!
//! This binary runs as an MCP server using stdio transport, allowing an MCP
//! client such as Claude Desktop to work with TOPdesk tickets.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `TOPDESK_URL`: Base URL of your TOPdesk instance
//! - `TOPDESK_USERNAME`: Operator login name
//! - `TOPDESK_PASSWORD`: Application password
//!
//! # Usage
//!
//! ```bash
//! TOPDESK_URL=https://company.topdesk.net TOPDESK_USERNAME=api \
//!     TOPDESK_PASSWORD=xxx ./topdesk-mcp
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use topdesk_mcp::{config, resources, server, topdesk_client};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries MCP JSON-RPC, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("topdesk_mcp=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting TOPdesk MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    let client = topdesk_client::TopdeskClient::new(&config)
        .context("Failed to create TOPdesk client")?;

    tracing::debug!(base_url = %client.base_url(), "TOPdesk client initialized");

    tracing::info!("Testing connection to TOPdesk...");
    match client.test_connection().await {
        Ok(version) => tracing::info!(version = %version, "Connected to TOPdesk"),
        Err(e) => {
            tracing::error!(
                error = %e.sanitized_display(client.password_for_sanitization()),
                "Connection test failed"
            );
            tracing::warn!(
                "Server will start but may not be able to reach TOPdesk. \
                 Check configuration and network connectivity."
            );
        }
    }

    let store = resources::ResourceStore::from_override(config.resources_dir.clone());
    match store.dir() {
        Some(dir) => tracing::debug!(dir = %dir.display(), "Serving guides from directory"),
        None => tracing::debug!("Serving built-in guides"),
    }

    let secret = client.password_for_sanitization().to_string();
    let server = server::TopdeskServer::new(Arc::new(client), store).with_secret(secret);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
