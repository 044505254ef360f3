//! Pixel to tile coordinate calculations

use crate::error::{Error, Result};
use crate::formats::tiff::IFD;
use crate::types::Dimensions;

/// Largest tile accepted, in pixels
pub const MAX_TILE_PIXELS: u64 = 4096 * 4096;

/// Maps image pixel coordinates to tiles and in-tile offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLocator {
    image: Dimensions,
    tile: Dimensions,
}

impl PixelLocator {
    /// Creates a locator for an image split into tiles of `tile` size
    pub fn new(image: Dimensions, tile: Dimensions) -> Result<Self> {
        if tile.width == 0 || tile.height == 0 {
            return Err(Error::InvalidFormat("Tile dimensions must be non-zero".to_string()));
        }
        if tile.width.checked_mul(tile.height).map_or(true, |n| n > MAX_TILE_PIXELS) {
            return Err(Error::InvalidFormat(format!(
                "Tile of {}x{} pixels exceeds {}",
                tile.width, tile.height, MAX_TILE_PIXELS
            )));
        }
        let locator = Self { image, tile };
        locator.tile_count()?;
        Ok(locator)
    }

    /// Creates a locator from a tiled IFD
    pub fn from_ifd(ifd: &IFD) -> Result<Self> {
        if !ifd.is_tiled() {
            return Err(Error::Unsupported("Only tiled images supported".to_string()));
        }
        let image = ifd.dimensions()
            .ok_or_else(|| Error::InvalidFormat("Missing dimensions".to_string()))?;
        let tile = ifd.tile_dimensions()
            .ok_or_else(|| Error::InvalidFormat("Missing tile dimensions".to_string()))?;
        Self::new(image, tile)
    }

    /// Image dimensions
    pub fn image(&self) -> Dimensions {
        self.image
    }

    /// Tile dimensions
    pub fn tile(&self) -> Dimensions {
        self.tile
    }

    /// Number of tile columns
    pub fn tiles_across(&self) -> u64 {
        self.image.width.div_ceil(self.tile.width)
    }

    /// Number of tile rows
    pub fn tiles_down(&self) -> u64 {
        self.image.height.div_ceil(self.tile.height)
    }

    /// Number of tiles in the image
    pub fn tile_count(&self) -> Result<usize> {
        self.tiles_across()
            .checked_mul(self.tiles_down())
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "Image of {}x{} pixels has too many tiles",
                    self.image.width, self.image.height
                ))
            })
    }

    /// Whether the pixel lies inside the image
    pub fn contains(&self, x: u64, y: u64) -> bool {
        x < self.image.width && y < self.image.height
    }

    /// Calculates which tile contains a pixel
    pub fn tile_index(&self, x: u64, y: u64) -> Result<usize> {
        if !self.contains(x, y) {
            return Err(Error::OutOfBounds(format!(
                "Pixel ({}, {}) outside image bounds ({}, {})",
                x, y, self.image.width, self.image.height
            )));
        }

        let tile_x = x / self.tile.width;
        let tile_y = y / self.tile.height;
        Ok((tile_y * self.tiles_across() + tile_x) as usize)
    }

    /// Calculates pixel index within its tile
    pub fn pixel_index(&self, x: u64, y: u64) -> usize {
        let pixel_x = (x % self.tile.width) as usize;
        let pixel_y = (y % self.tile.height) as usize;
        pixel_y * self.tile.width as usize + pixel_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tiff::{IFD, IFDEntry, tags};
    use crate::formats::tiff::tags::field_types;

    fn create_test_ifd(width: u64, height: u64, tile_width: u64, tile_height: u64) -> IFD {
        let mut ifd = IFD::new(0, 0);
        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height));
        ifd.add_entry(IFDEntry::new(tags::TILE_WIDTH, field_types::LONG, 1, tile_width));
        ifd.add_entry(IFDEntry::new(tags::TILE_LENGTH, field_types::LONG, 1, tile_height));
        ifd
    }

    #[test]
    fn test_stripped_image_rejected() {
        let mut ifd = IFD::new(0, 0);
        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, 10));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, 10));
        assert!(matches!(PixelLocator::from_ifd(&ifd), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_tile_index() {
        let locator = PixelLocator::from_ifd(&create_test_ifd(512, 512, 256, 256)).unwrap();

        assert_eq!(locator.tile_index(0, 0).unwrap(), 0);
        assert_eq!(locator.tile_index(255, 255).unwrap(), 0);
        assert_eq!(locator.tile_index(256, 0).unwrap(), 1);
        assert_eq!(locator.tile_index(0, 256).unwrap(), 2);
        assert_eq!(locator.tile_index(256, 256).unwrap(), 3);
        assert!(locator.tile_index(512, 0).is_err());
    }

    #[test]
    fn test_oversized_tiles_rejected() {
        let result = PixelLocator::from_ifd(&create_test_ifd(1 << 20, 1 << 20, 1 << 20, 1 << 20));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));

        let result = PixelLocator::new(Dimensions::new(u64::MAX, u64::MAX), Dimensions::new(1, 1));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_partial_edge_tiles() {
        let locator = PixelLocator::from_ifd(&create_test_ifd(10980, 10980, 1024, 1024)).unwrap();
        assert_eq!(locator.tiles_across(), 11);
        assert_eq!(locator.tiles_down(), 11);
        assert_eq!(locator.tile_index(10979, 10979).unwrap(), 120);
    }

    #[test]
    fn test_pixel_index() {
        let locator = PixelLocator::from_ifd(&create_test_ifd(512, 512, 256, 256)).unwrap();

        assert_eq!(locator.pixel_index(0, 0), 0);
        assert_eq!(locator.pixel_index(1, 0), 1);
        assert_eq!(locator.pixel_index(0, 1), 256);
        assert_eq!(locator.pixel_index(10, 5), 5 * 256 + 10);
        assert_eq!(locator.pixel_index(257, 0), 1);
    }
}
