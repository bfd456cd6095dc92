//! Stockbook API Server binary
//!
//! HTTP API for snapshots, workbook import/export and the product catalog.

use clap::Parser;
use stockbook::api::{run_api_server, ApiConfig};
use stockbook::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockbook-server")]
#[command(version)]
#[command(about = "Stockbook API Server - HTTP API for inventory counts")]
#[command(long_about = r#"
Stockbook API Server - HTTP API for inventory counts

Endpoints:
  - GET    /api/v1/buildings                 - Configured buildings
  - GET    /api/v1/snapshot/:building/:date  - Areas and counts
  - POST   /api/v1/import/:building/:date    - Import a workbook (raw body)
  - GET    /api/v1/export/:building/:date    - Download .xlsx
  - GET    /api/v1/products?q=               - Search the catalog
  - DELETE /api/v1/products/:id              - Delete a product everywhere

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs
  - Every change is saved to the store immediately

Example usage:
  stockbook-server                           # Start on localhost:8080
  stockbook-server --host 0.0.0.0 --port 3000

  curl -X POST --data-binary @counts.xlsx \
    http://localhost:8080/api/v1/import/bldg-1/2025-03-01
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "STOCKBOOK_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "STOCKBOOK_PORT")]
    port: u16,

    /// Config file (YAML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "STOCKBOOK_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        config_path: args.config,
    };

    run_api_server(config).await
}
