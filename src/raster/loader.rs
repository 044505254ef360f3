//! Calibrated band loading for resolved item sets

use std::sync::Arc;

use geo::Polygon;
use tracing::{info, instrument};

use crate::catalog::ItemSet;
use crate::config::LoaderConfig;
use crate::error::{Error, Result};

use super::calibration::Calibration;
use super::{Band, BandRequest, Raster, RasterSource};

/// Loads red and near-infrared reflectance clipped to a polygon
pub struct RasterLoaderAdapter {
    source: Arc<dyn RasterSource>,
    bands: Vec<BandRequest>,
}

impl RasterLoaderAdapter {
    pub fn new(source: Arc<dyn RasterSource>, config: &LoaderConfig) -> Self {
        Self {
            source,
            bands: vec![
                BandRequest::new(Band::Red, config.red_asset.clone()),
                BandRequest::new(Band::Nir, config.nir_asset.clone()),
            ],
        }
    }

    /// Loads and calibrates the bands of `items`
    ///
    /// Calibration is read before any pixel is fetched, so items without
    /// usable band metadata fail fast.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn load(&self, items: &ItemSet, polygon: &Polygon<f64>) -> Result<Raster> {
        if items.is_empty() {
            return Err(Error::Load("No items to load".to_string()));
        }

        let calibration = Calibration::from_items(items, &self.bands)?;
        let raw = self
            .source
            .load_raw(items, polygon, &self.bands)
            .await
            .map_err(Error::into_load)?;

        let raster = raw.calibrate(&calibration)?;
        let shape = raster.shape();
        info!(
            days = ?raster.times(),
            time = shape.time,
            height = shape.height,
            width = shape.width,
            "Loaded raster"
        );
        Ok(raster)
    }
}
