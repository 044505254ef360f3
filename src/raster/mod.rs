//! Multi-band rasters built from catalog items

pub mod calibration;
pub mod grid;
pub mod solar_day;
pub mod cog;
pub mod loader;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use geo::Polygon;

use crate::catalog::ItemSet;
use crate::error::{Error, Result};

pub use calibration::{BandCalibration, Calibration};
pub use cog::CogRasterSource;
pub use grid::Grid;
pub use loader::RasterLoaderAdapter;

/// Spectral bands used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Red,
    Nir,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Red => write!(f, "red"),
            Band::Nir => write!(f, "nir"),
        }
    }
}

/// A band together with the item asset key that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandRequest {
    pub band: Band,
    pub asset: String,
}

impl BandRequest {
    pub fn new(band: Band, asset: impl Into<String>) -> Self {
        Self { band, asset: asset.into() }
    }
}

/// Raster dimensions in `(time, y, x)` order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterShape {
    pub time: usize,
    pub height: usize,
    pub width: usize,
}

impl RasterShape {
    pub fn new(time: usize, height: usize, width: usize) -> Self {
        Self { time, height, width }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.time * self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sizes indexed by `Dim as usize`
    pub fn sizes(&self) -> [usize; 3] {
        [self.time, self.height, self.width]
    }
}

/// Row-major `(time, y, x)` band arrays with one time step per solar day
#[derive(Debug, Clone)]
struct BandStack {
    shape: RasterShape,
    times: Vec<NaiveDate>,
    bands: HashMap<Band, Vec<f64>>,
}

impl BandStack {
    fn insert(&mut self, band: Band, values: Vec<f64>) -> Result<()> {
        if values.len() != self.shape.len() {
            return Err(Error::Load(format!(
                "Band {} has {} values, expected {}",
                band,
                values.len(),
                self.shape.len()
            )));
        }
        self.bands.insert(band, values);
        Ok(())
    }

    fn band(&self, band: Band) -> Result<&[f64]> {
        self.bands
            .get(&band)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Load(format!("Band {} was not loaded", band)))
    }
}

/// Digital numbers exactly as stored in the source files; missing pixels
/// are NaN
#[derive(Debug, Clone)]
pub struct RawRaster {
    stack: BandStack,
}

impl RawRaster {
    pub fn new(shape: RasterShape, times: Vec<NaiveDate>) -> Self {
        Self {
            stack: BandStack { shape, times, bands: HashMap::new() },
        }
    }

    /// Adds a band; `values` must hold `shape.len()` cells
    pub fn insert_band(&mut self, band: Band, values: Vec<f64>) -> Result<()> {
        self.stack.insert(band, values)
    }

    pub fn shape(&self) -> RasterShape {
        self.stack.shape
    }

    pub fn band(&self, band: Band) -> Result<&[f64]> {
        self.stack.band(band)
    }

    /// Applies `value * scale + offset` to every band, consuming the raw data
    pub fn calibrate(self, calibration: &Calibration) -> Result<Raster> {
        let mut stack = self.stack;
        for (band, values) in stack.bands.iter_mut() {
            calibration.get(*band)?.apply(values);
        }
        Ok(Raster { stack })
    }
}

/// Calibrated reflectance; there is no way to calibrate it again
#[derive(Debug, Clone)]
pub struct Raster {
    stack: BandStack,
}

impl Raster {
    pub fn shape(&self) -> RasterShape {
        self.stack.shape
    }

    /// Solar days along the time axis
    pub fn times(&self) -> &[NaiveDate] {
        &self.stack.times
    }

    pub fn band(&self, band: Band) -> Result<&[f64]> {
        self.stack.band(band)
    }

    /// Builds a raster from values that are already reflectance
    #[cfg(test)]
    pub(crate) fn from_reflectance(shape: RasterShape, bands: Vec<(Band, Vec<f64>)>) -> Result<Self> {
        let mut raw = RawRaster::new(shape, Vec::new());
        for (band, values) in bands {
            raw.insert_band(band, values)?;
        }
        Ok(Raster { stack: raw.stack })
    }
}

/// Loads uncalibrated band data for a set of items, clipped to a polygon
#[async_trait]
pub trait RasterSource: Send + Sync {
    async fn load_raw(
        &self,
        items: &ItemSet,
        polygon: &Polygon<f64>,
        bands: &[BandRequest],
    ) -> Result<RawRaster>;
}
