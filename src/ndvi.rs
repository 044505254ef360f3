//! NDVI computation and skip-missing statistics

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::{Band, Raster, RasterShape};

/// Mean and population standard deviation of NDVI over a polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdviStats {
    pub mean_ndvi: f64,
    pub std_ndvi: f64,
}

/// Array dimensions, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Time = 0,
    Y = 1,
    X = 2,
}

impl Dim {
    pub const ALL: [Dim; 3] = [Dim::Time, Dim::Y, Dim::X];
}

/// `(nir - red) / (nir + red)`; NaN where undefined
pub fn ndvi(nir: f64, red: f64) -> f64 {
    let denominator = nir + red;
    if !nir.is_finite() || !red.is_finite() || denominator == 0.0 {
        return f64::NAN;
    }
    let value = (nir - red) / denominator;
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// Per-pixel NDVI over `(time, y, x)`
#[derive(Debug, Clone)]
pub struct NdviArray {
    shape: RasterShape,
    values: Vec<f64>,
}

/// Result of reducing an [`NdviArray`] over some dimensions: one mean and
/// one standard deviation per index of the remaining dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl NdviArray {
    pub fn new(shape: RasterShape, values: Vec<f64>) -> Result<Self> {
        if values.len() != shape.len() {
            return Err(Error::InvalidFormat(format!(
                "NDVI array has {} values for shape {:?}",
                values.len(),
                shape
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn shape(&self) -> RasterShape {
        self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of defined pixels
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Mean and population standard deviation over `dims`, skipping NaN
    ///
    /// Output indices with no defined pixel hold NaN.
    pub fn reduce(&self, dims: &[Dim]) -> Reduced {
        let sizes = self.shape.sizes();
        let kept: Vec<usize> = Dim::ALL
            .iter()
            .filter(|d| !dims.contains(d))
            .map(|&d| d as usize)
            .collect();
        let out_len: usize = kept.iter().map(|&axis| sizes[axis]).product();

        let output_index = |flat: usize| -> usize {
            let coords = [
                flat / (sizes[1] * sizes[2]),
                (flat / sizes[2]) % sizes[1],
                flat % sizes[2],
            ];
            kept.iter().fold(0, |acc, &axis| acc * sizes[axis] + coords[axis])
        };

        let mut count = vec![0usize; out_len];
        let mut sum = vec![0.0f64; out_len];
        for (flat, &v) in self.values.iter().enumerate() {
            if !v.is_nan() {
                let o = output_index(flat);
                count[o] += 1;
                sum[o] += v;
            }
        }

        let mean: Vec<f64> = sum
            .iter()
            .zip(&count)
            .map(|(&s, &n)| if n == 0 { f64::NAN } else { s / n as f64 })
            .collect();

        let mut squares = vec![0.0f64; out_len];
        for (flat, &v) in self.values.iter().enumerate() {
            if !v.is_nan() {
                let o = output_index(flat);
                squares[o] += (v - mean[o]).powi(2);
            }
        }

        let std = squares
            .iter()
            .zip(&count)
            .map(|(&sq, &n)| if n == 0 { f64::NAN } else { (sq / n as f64).sqrt() })
            .collect();

        Reduced { mean, std }
    }
}

impl TryFrom<Reduced> for NdviStats {
    type Error = Error;

    fn try_from(reduced: Reduced) -> Result<Self> {
        match (reduced.mean.as_slice(), reduced.std.as_slice()) {
            ([mean], [_]) if mean.is_nan() => Err(Error::NoValidPixels),
            ([mean], [std]) => Ok(Self { mean_ndvi: *mean, std_ndvi: *std }),
            (means, _) => Err(Error::AmbiguousReduction(means.len())),
        }
    }
}

/// Element-wise NDVI of a calibrated raster
pub fn compute_ndvi(raster: &Raster) -> Result<NdviArray> {
    let red = raster.band(Band::Red)?;
    let nir = raster.band(Band::Nir)?;

    let values: Vec<f64> = nir
        .par_iter()
        .zip(red.par_iter())
        .map(|(&n, &r)| ndvi(n, r))
        .collect();

    NdviArray::new(raster.shape(), values)
}

/// NDVI mean and standard deviation over every pixel and time step
pub fn compute_stats(raster: &Raster) -> Result<NdviStats> {
    let array = compute_ndvi(raster)?;
    debug!(
        valid = array.valid_count(),
        total = array.values().len(),
        "NDVI pixels"
    );
    NdviStats::try_from(array.reduce(&Dim::ALL))
}
