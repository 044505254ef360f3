//! Service configuration

use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;

/// Default STAC API endpoint for Sentinel-2 L2A
pub const DEFAULT_CATALOG_URL: &str = "https://earth-search.aws.element84.com/v1";

/// Default collection id
pub const DEFAULT_COLLECTION: &str = "sentinel-2-l2a";

/// STAC catalog settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the STAC API (without `/search`)
    pub url: String,
    pub collection: String,
    /// Half-width in days of the fallback search window
    pub window_days: u32,
    /// Items requested per page
    pub page_size: usize,
    /// Upper bound on items collected across pages
    pub max_items: usize,
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            window_days: 10,
            page_size: 100,
            max_items: 500,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Raster loading settings
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Asset key of the red band
    pub red_asset: String,
    /// Asset key of the near-infrared band
    pub nir_asset: String,
    /// Initial header fetch size
    pub header_bytes: u64,
    /// Largest header fetch before giving up
    pub max_header_bytes: u64,
    /// Concurrent tile requests per band load
    pub fetch_concurrency: usize,
    /// Largest output grid (cells per time step) accepted for one polygon
    pub max_pixels: usize,
    pub request_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            red_asset: "red".to_string(),
            nir_asset: "nir".to_string(),
            header_bytes: 64 * 1024,
            max_header_bytes: 4 * 1024 * 1024,
            fetch_concurrency: 8,
            max_pixels: 16_000_000,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Default scene filters applied to every search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDefaults {
    /// Exclusive upper bound on `eo:cloud_cover`
    pub max_cloud_cover: f64,
    /// Exclusive lower bound on `s2:vegetation_percentage`
    pub min_vegetation_percentage: f64,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            max_cloud_cover: 0.2,
            min_vegetation_percentage: 25.0,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit: 1024 * 1024,
        }
    }
}

/// Command-line and environment overrides shared by the binaries
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// STAC API base URL
    #[arg(long, default_value = DEFAULT_CATALOG_URL, env = "NDVI_CATALOG_URL")]
    pub catalog_url: String,

    /// STAC collection id
    #[arg(long, default_value = DEFAULT_COLLECTION, env = "NDVI_COLLECTION")]
    pub collection: String,

    /// Half-width in days of the fallback search window
    #[arg(long, default_value_t = 10, env = "NDVI_WINDOW_DAYS")]
    pub window_days: u32,

    /// Exclusive upper bound on scene cloud cover
    #[arg(long, default_value_t = 0.2, env = "NDVI_MAX_CLOUD_COVER")]
    pub max_cloud_cover: f64,

    /// Exclusive lower bound on scene vegetation percentage
    #[arg(long, default_value_t = 25.0, env = "NDVI_MIN_VEGETATION")]
    pub min_vegetation_percentage: f64,

    /// Asset key of the red band
    #[arg(long, default_value = "red", env = "NDVI_RED_ASSET")]
    pub red_asset: String,

    /// Asset key of the near-infrared band
    #[arg(long, default_value = "nir", env = "NDVI_NIR_ASSET")]
    pub nir_asset: String,

    /// Concurrent tile requests per band
    #[arg(long, default_value_t = 8, env = "NDVI_FETCH_CONCURRENCY")]
    pub fetch_concurrency: usize,

    /// Catalog request timeout in seconds
    #[arg(long, default_value_t = 30, env = "NDVI_CATALOG_TIMEOUT")]
    pub catalog_timeout: u64,

    /// Raster request timeout in seconds
    #[arg(long, default_value_t = 60, env = "NDVI_RASTER_TIMEOUT")]
    pub raster_timeout: u64,
}

impl ServiceArgs {
    pub fn catalog(&self) -> CatalogConfig {
        CatalogConfig {
            url: self.catalog_url.clone(),
            collection: self.collection.clone(),
            window_days: self.window_days,
            request_timeout: Duration::from_secs(self.catalog_timeout),
            ..CatalogConfig::default()
        }
    }

    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig {
            red_asset: self.red_asset.clone(),
            nir_asset: self.nir_asset.clone(),
            fetch_concurrency: self.fetch_concurrency,
            request_timeout: Duration::from_secs(self.raster_timeout),
            ..LoaderConfig::default()
        }
    }

    pub fn filters(&self) -> FilterDefaults {
        FilterDefaults {
            max_cloud_cover: self.max_cloud_cover,
            min_vegetation_percentage: self.min_vegetation_percentage,
        }
    }
}
