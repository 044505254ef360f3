//! Coordinate reference system transforms

pub mod coordinate;
pub mod transformer;

pub use coordinate::Coordinate;
pub use transformer::Transformer;

/// Frequently used EPSG codes
pub mod epsg {
    /// WGS84 geographic coordinates (lon/lat order)
    pub const WGS84: u16 = 4326;
}
