//! NDVI API server

use std::net::SocketAddr;

use clap::Parser;
use tracing::{error, info};

use sentinel_ndvi::api::{create_router, AppState};
use sentinel_ndvi::{logging, NdviPipeline, ServerConfig, ServiceArgs};

/// Sentinel-2 NDVI API server
#[derive(Parser, Debug)]
#[command(name = "api-server")]
#[command(about = "Serves NDVI statistics for GeoJSON polygons from Sentinel-2 L2A imagery")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000", env = "NDVI_LISTEN_ADDR")]
    listen: SocketAddr,

    /// Maximum request body in bytes
    #[arg(long, default_value_t = 1024 * 1024, env = "NDVI_BODY_LIMIT")]
    body_limit: usize,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "NDVI_LOG_JSON")]
    json_logs: bool,

    #[command(flatten)]
    service: ServiceArgs,
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(&args.log_level, args.json_logs);

    let server = ServerConfig {
        listen_addr: args.listen,
        body_limit: args.body_limit,
    };

    let pipeline = match NdviPipeline::from_config(
        args.service.catalog(),
        args.service.loader(),
        args.service.filters(),
    ) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to initialize pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(AppState::new(pipeline), server.body_limit);

    let listener = match tokio::net::TcpListener::bind(server.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", server.listen_addr, e);
            std::process::exit(1);
        }
    };

    info!(
        addr = %server.listen_addr,
        catalog = %args.service.catalog_url,
        collection = %args.service.collection,
        "Starting NDVI API server"
    );
    info!("  POST /api/v1/sentinel2/query");
    info!("  GET  /health");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
