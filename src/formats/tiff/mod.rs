//! TIFF, BigTIFF and GeoTIFF header support for cloud-optimized rasters

pub mod tags;
pub mod ifd;
pub mod reader;
pub mod geotiff;
pub mod cog;

#[cfg(test)]
pub(crate) mod testing;

pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use geotiff::GeoInfo;
pub use cog::CogHeader;

/// TIFF magic number (42)
pub const TIFF_MAGIC: u16 = 42;

/// BigTIFF magic number (43)
pub const BIGTIFF_MAGIC: u16 = 43;
