//! Scale/offset calibration from STAC raster metadata

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::ItemSet;
use crate::error::{Error, Result};

use super::{Band, BandRequest};

/// Linear calibration `value * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCalibration {
    pub scale: f64,
    pub offset: f64,
}

impl BandCalibration {
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// Raster-extension defaults for an entry without scale/offset
    pub fn identity() -> Self {
        Self::new(1.0, 0.0)
    }

    pub fn apply(&self, values: &mut [f64]) {
        for v in values.iter_mut() {
            *v = *v * self.scale + self.offset;
        }
    }
}

/// Calibration per band for one item set
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    bands: HashMap<Band, BandCalibration>,
}

impl Calibration {
    pub fn new(bands: impl IntoIterator<Item = (Band, BandCalibration)>) -> Self {
        Self { bands: bands.into_iter().collect() }
    }

    /// Reads calibration for each band from the first item (in catalog
    /// order) whose asset carries `raster:bands` metadata
    ///
    /// The same values are applied to every scene of the set.
    pub fn from_items(items: &ItemSet, bands: &[BandRequest]) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::Load("No items to calibrate".to_string()));
        }

        let mut calibration = Self::default();
        for request in bands {
            if !items.iter().any(|item| item.asset(&request.asset).is_some()) {
                return Err(Error::Load(format!(
                    "Band asset '{}' missing from item metadata",
                    request.asset
                )));
            }

            let (item, entry) = items
                .iter()
                .find_map(|item| item.raster_band(&request.asset).map(|b| (item, b)))
                .ok_or_else(|| {
                    Error::Load(format!("Asset '{}' has no raster:bands metadata", request.asset))
                })?;

            let band = BandCalibration::new(entry.scale.unwrap_or(1.0), entry.offset.unwrap_or(0.0));
            debug!(
                band = %request.band,
                item = %item.id,
                scale = band.scale,
                offset = band.offset,
                "Calibration"
            );
            calibration.bands.insert(request.band, band);
        }

        Ok(calibration)
    }

    pub fn get(&self, band: Band) -> Result<BandCalibration> {
        self.bands
            .get(&band)
            .copied()
            .ok_or_else(|| Error::Load(format!("No calibration for band {}", band)))
    }
}
