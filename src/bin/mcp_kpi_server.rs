//! MCP server binary for the startup KPI dashboard.
//!
//! # Usage
//!
//! ```bash
//! mcp-kpi-server --api-url http://127.0.0.1:8000
//! ```
//!
//! # Claude Desktop Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "startup-kpi": {
//!       "command": "/path/to/mcp-kpi-server",
//!       "args": ["--api-url", "http://127.0.0.1:8000"]
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use clap::Parser;
use kpi_dashboard::mcp::{client::KpiApiClient, KpiMcpServer};
use rmcp::{transport::stdio, ServiceExt};

#[derive(Parser, Debug)]
#[command(name = "mcp-kpi-server")]
#[command(about = "MCP server for startup KPI analysis")]
#[command(version)]
struct Args {
    /// Base URL of the KPI dashboard HTTP API.
    #[arg(long, env = "KPI_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr; stdout carries the MCP protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = KpiApiClient::new(&args.api_url)?;
    let server = KpiMcpServer::new(client);

    tracing::info!(api_url = %args.api_url, "Starting mcp-kpi-server");

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {}", e))?;

    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {}", e))?;

    Ok(())
}
