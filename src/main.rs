//! HTTP API server for the startup KPI dashboard.
//!
//! Builds the metrics table once at startup and serves it read-only.

use std::sync::Arc;

use clap::Parser;

use kpi_dashboard::analytics::InsightRules;
use kpi_dashboard::server::{run_server, ServerConfig};
use kpi_dashboard::store::MetricsStore;

/// Startup KPI dashboard API server
#[derive(Parser, Debug)]
#[command(name = "kpi-dashboard")]
#[command(about = "Serve startup business metrics and KPI data over HTTP")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "KPI_PORT", default_value = "8000")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = Arc::new(MetricsStore::builtin());
    let rules = Arc::new(InsightRules::with_defaults());

    tracing::info!(
        port = args.port,
        metrics = store.metrics.len(),
        last_updated = %store.last_updated,
        "Starting kpi-dashboard"
    );

    run_server(store, rules, ServerConfig { port: args.port }).await
}
