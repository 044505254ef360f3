//! GeoTIFF georeferencing

use std::fmt;
use crate::error::{Error, Result};
use crate::projection::Coordinate;
use super::ifd::IFD;
use super::tags;
use super::reader::TiffReader;

/// GeoTIFF information extracted from an IFD
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    /// Model pixel scale (ScaleX, ScaleY, ScaleZ)
    pub pixel_scale: Option<(f64, f64, f64)>,
    /// Model tiepoints (pixel coord -> geo coord mapping)
    pub tiepoints: Vec<TiePoint>,
    /// Row-major 4x4 ModelTransformation matrix
    pub transformation: Option<[f64; 16]>,
    /// EPSG code if detected
    pub epsg_code: Option<u16>,
}

/// Represents a GeoTIFF tiepoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiePoint {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub pixel_z: f64,
    pub geo_x: f64,
    pub geo_y: f64,
    pub geo_z: f64,
}

/// GeoKey constants
mod geo_keys {
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    pub const PROJECTED_CS_TYPE: u16 = 3072;
    /// Marks a user-defined rather than EPSG-coded CRS
    pub const USER_DEFINED: u16 = 32767;
}

impl GeoInfo {
    /// North-up georeferencing with square pixels and the upper-left corner
    /// of pixel (0, 0) at `(origin_x, origin_y)`
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_size: f64, epsg: u16) -> Self {
        Self {
            pixel_scale: Some((pixel_size, pixel_size, 0.0)),
            tiepoints: vec![TiePoint {
                pixel_x: 0.0,
                pixel_y: 0.0,
                pixel_z: 0.0,
                geo_x: origin_x,
                geo_y: origin_y,
                geo_z: 0.0,
            }],
            transformation: None,
            epsg_code: Some(epsg),
        }
    }

    /// Extracts GeoTIFF information from an IFD
    ///
    /// Returns `None` when the IFD carries no georeferencing tags.
    pub fn from_ifd(ifd: &IFD, reader: &mut TiffReader) -> Result<Option<Self>> {
        let has_geo_tags = ifd.get_entry(tags::MODEL_PIXEL_SCALE).is_some()
            || ifd.get_entry(tags::MODEL_TIEPOINT).is_some()
            || ifd.get_entry(tags::MODEL_TRANSFORMATION).is_some();

        if !has_geo_tags {
            return Ok(None);
        }

        let mut geo_info = GeoInfo {
            pixel_scale: None,
            tiepoints: Vec::new(),
            transformation: None,
            epsg_code: None,
        };

        if let Some(entry) = ifd.get_entry(tags::MODEL_PIXEL_SCALE) {
            let values = reader.read_tag_doubles(entry)?;
            if values.len() >= 3 {
                geo_info.pixel_scale = Some((values[0], values[1], values[2]));
            }
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TIEPOINT) {
            let values = reader.read_tag_doubles(entry)?;
            geo_info.tiepoints = values
                .chunks_exact(6)
                .map(|c| TiePoint {
                    pixel_x: c[0],
                    pixel_y: c[1],
                    pixel_z: c[2],
                    geo_x: c[3],
                    geo_y: c[4],
                    geo_z: c[5],
                })
                .collect();
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TRANSFORMATION) {
            let values = reader.read_tag_doubles(entry)?;
            if values.len() == 16 {
                let mut matrix = [0.0; 16];
                matrix.copy_from_slice(&values);
                geo_info.transformation = Some(matrix);
            }
        }

        if let Some(entry) = ifd.get_entry(tags::GEO_KEY_DIRECTORY) {
            let keys = reader.read_tag_u16s(entry)?;
            geo_info.epsg_code = epsg_from_geo_keys(&keys);
        }

        Ok(Some(geo_info))
    }

    /// Computes the affine transform from pixel to geo coordinates
    ///
    /// Returns [a, b, c, d, e, f] where:
    /// geo_x = a + b * pixel_x + c * pixel_y
    /// geo_y = d + e * pixel_x + f * pixel_y
    pub fn affine_transform(&self) -> Option<[f64; 6]> {
        if let Some(m) = &self.transformation {
            return Some([m[3], m[0], m[1], m[7], m[4], m[5]]);
        }

        let (scale_x, scale_y, _) = self.pixel_scale?;
        let tp = self.tiepoints.first()?;
        Some([
            tp.geo_x - scale_x * tp.pixel_x,
            scale_x,
            0.0,
            tp.geo_y + scale_y * tp.pixel_y,
            0.0,
            -scale_y,
        ])
    }

    /// Pixel size as (x, y) magnitudes in CRS units
    pub fn pixel_size(&self) -> Option<(f64, f64)> {
        let t = self.affine_transform()?;
        Some((t[1].abs(), t[5].abs()))
    }

    /// Computes the bounding box in geo coordinates
    ///
    /// Returns (min_x, min_y, max_x, max_y)
    pub fn bounding_box(&self, width: u64, height: u64) -> Option<(f64, f64, f64, f64)> {
        let corners = [
            self.pixel_to_geo(0.0, 0.0)?,
            self.pixel_to_geo(width as f64, 0.0)?,
            self.pixel_to_geo(0.0, height as f64)?,
            self.pixel_to_geo(width as f64, height as f64)?,
        ];

        let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

        Some((min_x, min_y, max_x, max_y))
    }

    /// Converts (fractional) pixel coordinates to geographic coordinates
    pub fn pixel_to_geo(&self, pixel_x: f64, pixel_y: f64) -> Option<Coordinate> {
        let t = self.affine_transform()?;

        let geo_x = t[0] + t[1] * pixel_x + t[2] * pixel_y;
        let geo_y = t[3] + t[4] * pixel_x + t[5] * pixel_y;

        Some(Coordinate::new(geo_x, geo_y))
    }

    /// Converts geographic coordinates to fractional pixel coordinates
    pub fn geo_to_pixel(&self, geo_coord: Coordinate) -> Option<(f64, f64)> {
        let t = self.affine_transform()?;

        let det = t[1] * t[5] - t[2] * t[4];
        if det.abs() < 1e-10 {
            return None;
        }

        let dx = geo_coord.x - t[0];
        let dy = geo_coord.y - t[3];

        let pixel_x = (t[5] * dx - t[2] * dy) / det;
        let pixel_y = (-t[4] * dx + t[1] * dy) / det;

        Some((pixel_x, pixel_y))
    }

    /// Returns the EPSG code or a projection error
    pub fn require_epsg(&self) -> Result<u16> {
        self.epsg_code
            .ok_or_else(|| Error::Projection("No EPSG code available".to_string()))
    }
}

/// Reads the EPSG code out of a GeoKeyDirectory
///
/// Projected CRS codes take precedence over geographic ones.
fn epsg_from_geo_keys(keys: &[u16]) -> Option<u16> {
    if keys.len() < 4 {
        return None;
    }

    let num_keys = keys[3] as usize;
    let mut geographic = None;
    let mut projected = None;

    for key in keys[4..].chunks_exact(4).take(num_keys) {
        let (key_id, location, value) = (key[0], key[1], key[3]);
        // Location 0 means the value is stored directly in the entry
        if location != 0 || value == 0 || value == geo_keys::USER_DEFINED {
            continue;
        }
        match key_id {
            geo_keys::PROJECTED_CS_TYPE => projected = Some(value),
            geo_keys::GEOGRAPHIC_TYPE => geographic = Some(value),
            _ => {}
        }
    }

    projected.or(geographic)
}

impl fmt::Display for GeoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epsg) = self.epsg_code {
            write!(f, "EPSG:{}", epsg)?;
        } else {
            write!(f, "EPSG:unknown")?;
        }

        if let Some((sx, sy)) = self.pixel_size() {
            write!(f, " {}x{}", sx, sy)?;
        }

        Ok(())
    }
}
