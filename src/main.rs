use std::path::Path;

use anyhow::Context;
use clap::Parser;

use sentinel_ndvi::{logging, GeoJsonPolygon, NdviPipeline, ServiceArgs};

/// Computes NDVI statistics for one polygon and date
#[derive(Parser, Debug)]
#[command(name = "sentinel-ndvi")]
#[command(about = "Mean and standard deviation of Sentinel-2 NDVI inside a GeoJSON polygon")]
struct Args {
    /// ISO-8601 date or date-time
    #[arg(short, long)]
    timestamp: String,

    /// GeoJSON Polygon, inline or as a path to a file
    #[arg(short, long)]
    polygon: String,

    /// Log level
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(flatten)]
    service: ServiceArgs,
}

fn read_polygon(arg: &str) -> anyhow::Result<GeoJsonPolygon> {
    let text = if Path::new(arg).is_file() {
        std::fs::read_to_string(arg).with_context(|| format!("Failed to read {}", arg))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).context("Polygon is not a GeoJSON geometry object")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(&args.log_level, false);

    let polygon = read_polygon(&args.polygon)?;
    let pipeline = NdviPipeline::from_config(
        args.service.catalog(),
        args.service.loader(),
        args.service.filters(),
    )?;

    let stats = pipeline
        .run(&args.timestamp, &polygon)
        .await
        .map_err(|failure| anyhow::anyhow!(failure.detail()))?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
