//! tabclean API Server binary
//!
//! HTTP upload API for previewing, cleaning and converting CSV / Excel files.

use clap::Parser;
use tabclean::api::server::DEFAULT_MAX_UPLOAD_MB;
use tabclean::api::{run_api_server, ApiConfig};
use tabclean::core::DEFAULT_PREVIEW_ROWS;

#[derive(Parser, Debug)]
#[command(name = "tabclean-server")]
#[command(version)]
#[command(about = "tabclean API Server - upload CSV / Excel files to preview, clean and convert")]
#[command(long_about = r#"
tabclean API Server - HTTP upload API

Upload endpoints (multipart/form-data, one or more file fields):
  - POST /api/v1/preview  - First rows of each file
  - POST /api/v1/process  - Fill missing / drop / chart, JSON report per file
  - POST /api/v1/convert  - Clean one file and download <name>_cleaned.<ext>

Option fields: fill_missing=true, drop=a,b, chart=true, format=csv|excel

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs
  - Tracing and structured logging

Example usage:
  tabclean-server                           # Start on localhost:8080
  tabclean-server --host 0.0.0.0 --port 3000

  curl -F file=@sales.csv -F fill_missing=true -F format=excel \
    http://localhost:8080/api/v1/convert -OJ
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "TABCLEAN_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "TABCLEAN_PORT")]
    port: u16,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_MB, env = "TABCLEAN_MAX_UPLOAD_MB")]
    max_upload_mb: usize,

    /// Rows included in previews
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS, env = "TABCLEAN_PREVIEW_ROWS")]
    preview_rows: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
        preview_rows: args.preview_rows,
    };

    run_api_server(config).await
}
