//! sentinel-ndvi - NDVI statistics for a polygon from Sentinel-2 L2A imagery
//!
//! A query names a date and a GeoJSON polygon. The catalog is searched for
//! scenes on that date, falling back to the nearest date within a window
//! around it. Red and near-infrared bands are read from cloud-optimized
//! GeoTIFFs by HTTP range requests, calibrated, and reduced to the mean and
//! standard deviation of NDVI inside the polygon.
//!
//! # Examples
//!
//! ```no_run
//! use sentinel_ndvi::{CatalogConfig, FilterDefaults, GeoJsonPolygon, LoaderConfig, NdviPipeline};
//!
//! # async fn run() -> sentinel_ndvi::Result<()> {
//! let pipeline = NdviPipeline::from_config(
//!     CatalogConfig::default(),
//!     LoaderConfig::default(),
//!     FilterDefaults::default(),
//! )?;
//!
//! let polygon: GeoJsonPolygon = serde_json::from_str(
//!     r#"{"type": "Polygon", "coordinates": [[[8.5, 47.3], [8.6, 47.3], [8.6, 47.4], [8.5, 47.3]]]}"#,
//! )
//! .unwrap();
//!
//! match pipeline.run("2024-06-15", &polygon).await {
//!     Ok(stats) => println!("mean {} std {}", stats.mean_ndvi, stats.std_ndvi),
//!     Err(failure) => eprintln!("{}", failure.detail()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod io;
pub mod error;
pub mod types;
pub mod formats;
pub mod compression;
pub mod projection;
pub mod config;
pub mod logging;
pub mod geometry;
pub mod catalog;
pub mod raster;
pub mod ndvi;
pub mod pipeline;
pub mod api;

pub use error::{Error, FailureKind, Result};
pub use types::{DataType, Dimensions};
pub use formats::tiff::{CogHeader, GeoInfo, TiffReader, IFD, IFDEntry};
pub use io::{ByteOrder, ByteSource, HttpByteSource};
pub use projection::{Coordinate, Transformer};
pub use config::{CatalogConfig, FilterDefaults, LoaderConfig, ServerConfig, ServiceArgs};
pub use geometry::{parse_timestamp, validate_polygon, GeoJsonPolygon};
pub use catalog::{Catalog, CatalogItem, CatalogResolver, ItemSet, SearchFilters, SearchRequest, StacClient};
pub use raster::{Band, BandRequest, CogRasterSource, Raster, RasterLoaderAdapter, RasterShape, RasterSource, RawRaster};
pub use ndvi::{compute_stats, NdviStats};
pub use pipeline::{NdviPipeline, PipelineFailure, Stage};
