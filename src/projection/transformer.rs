use crate::error::{Error, Result};
use crate::projection::coordinate::Coordinate;
use proj::Proj;

/// Transforms coordinates between two EPSG coordinate reference systems
///
/// Same-CRS transformers skip PROJ entirely. `Proj` handles are not `Sync`,
/// so transformers are built and dropped inside synchronous code.
pub struct Transformer {
    proj: Option<Proj>,
}

impl Transformer {
    /// Creates a new transformer from source to target CRS using EPSG codes
    pub fn new(from_epsg: u16, to_epsg: u16) -> Result<Self> {
        let proj = if from_epsg == to_epsg {
            None
        } else {
            let from = format!("EPSG:{}", from_epsg);
            let to = format!("EPSG:{}", to_epsg);
            let proj = Proj::new_known_crs(&from, &to, None)
                .map_err(|e| Error::Projection(format!("Failed to create projection {} -> {}: {}", from, to, e)))?;
            Some(proj)
        };

        Ok(Self { proj })
    }

    /// Transforms a coordinate from source to target CRS
    pub fn transform(&self, coord: Coordinate) -> Result<Coordinate> {
        let Some(proj) = &self.proj else {
            return Ok(coord);
        };

        let (x, y) = proj.convert((coord.x, coord.y))
            .map_err(|e| Error::Projection(format!("Transformation failed: {}", e)))?;

        Ok(Coordinate::new(x, y))
    }

    /// Returns whether source and target CRS are the same
    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transformer::new(4326, 4326).unwrap();
        assert!(t.is_identity());
        let c = t.transform(Coordinate::new(7.5, 46.2)).unwrap();
        assert_eq!(c, Coordinate::new(7.5, 46.2));
    }

    #[test]
    fn test_wgs84_to_utm() {
        // Depends on the PROJ database being installed
        let Ok(t) = Transformer::new(4326, 32632) else {
            return;
        };
        let c = t.transform(Coordinate::from_lonlat(9.0, 0.0)).unwrap();
        assert!((c.x - 500_000.0).abs() < 1.0);
        assert!(c.y.abs() < 1.0);
    }
}
