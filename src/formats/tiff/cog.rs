//! Cloud-optimized GeoTIFF header

use bytes::Bytes;
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::types::DataType;
use super::geotiff::GeoInfo;
use super::reader::{PixelLocator, TiffReader, TileDecoder};
use super::tags;

/// Everything needed to fetch and decode tiles of a COG's full-resolution
/// image without touching the header again
#[derive(Debug, Clone)]
pub struct CogHeader {
    pub byte_order: ByteOrder,
    pub data_type: DataType,
    pub compression: Compression,
    pub predictor: u64,
    pub locator: PixelLocator,
    /// GDAL_NODATA value, if present and numeric
    pub nodata: Option<f64>,
    pub geo: GeoInfo,
    pub tile_offsets: Vec<u64>,
    pub tile_byte_counts: Vec<u64>,
}

impl CogHeader {
    /// Parses the header from the leading bytes of a COG
    ///
    /// Fails with an `UnexpectedEof` I/O error when `data` is too short to
    /// hold the IFD and the arrays it references.
    pub fn parse(data: Bytes) -> Result<Self> {
        let mut reader = TiffReader::from_bytes(data)?;
        let ifd = reader.read_main_ifd()?;

        if !ifd.is_tiled() {
            return Err(Error::Unsupported("Stripped TIFF layout".to_string()));
        }
        if ifd.samples_per_pixel() != 1 {
            return Err(Error::Unsupported(format!(
                "{} samples per pixel",
                ifd.samples_per_pixel()
            )));
        }
        if ifd.planar_configuration() != 1 {
            return Err(Error::Unsupported("Planar configuration 2".to_string()));
        }

        let data_type = ifd.data_type().ok_or_else(|| {
            Error::Unsupported(format!(
                "Sample format {} with {} bits",
                ifd.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(1),
                ifd.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(0)
            ))
        })?;
        let compression = Compression::from_tag(ifd.compression())?;
        let predictor = ifd.predictor();
        let locator = PixelLocator::from_ifd(&ifd)?;

        let offsets_entry = ifd.get_entry(tags::TILE_OFFSETS)
            .ok_or(Error::MissingTag(tags::TILE_OFFSETS))?;
        let counts_entry = ifd.get_entry(tags::TILE_BYTE_COUNTS)
            .ok_or(Error::MissingTag(tags::TILE_BYTE_COUNTS))?;
        let tile_offsets = reader.read_tag_u64s(offsets_entry)?;
        let tile_byte_counts = reader.read_tag_u64s(counts_entry)?;

        let expected_tiles = locator.tile_count()?;
        if tile_offsets.len() < expected_tiles || tile_byte_counts.len() < expected_tiles {
            return Err(Error::InvalidFormat(format!(
                "Expected {} tiles, found {} offsets and {} byte counts",
                expected_tiles,
                tile_offsets.len(),
                tile_byte_counts.len()
            )));
        }

        let nodata = match ifd.get_entry(tags::GDAL_NODATA) {
            Some(entry) => reader.read_tag_ascii(entry)?.trim().parse::<f64>().ok(),
            None => None,
        };

        let geo = GeoInfo::from_ifd(&ifd, &mut reader)?
            .ok_or_else(|| Error::InvalidFormat("Not a GeoTIFF".to_string()))?;
        if geo.affine_transform().is_none() {
            return Err(Error::InvalidFormat("Missing geotransform".to_string()));
        }

        Ok(Self {
            byte_order: reader.byte_order(),
            data_type,
            compression,
            predictor,
            locator,
            nodata,
            geo,
            tile_offsets,
            tile_byte_counts,
        })
    }

    /// Builds the tile decoder for this image
    pub fn decoder(&self) -> Result<TileDecoder> {
        TileDecoder::new(
            self.compression,
            self.predictor,
            self.data_type,
            self.byte_order,
            self.locator.tile(),
        )
    }

    /// Byte range `(offset, length)` of a tile; length 0 marks a sparse tile
    pub fn tile_range(&self, tile_index: usize) -> Result<(u64, u64)> {
        match (self.tile_offsets.get(tile_index), self.tile_byte_counts.get(tile_index)) {
            (Some(&offset), Some(&length)) => Ok((offset, length)),
            _ => Err(Error::OutOfBounds(format!("Tile index {}", tile_index))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tiff::testing::{bigtiff, bigtiff_with_tile_offsets, TiffBuilder};
    use crate::formats::tiff::tags::field_types;
    use crate::types::Dimensions;
    use std::io::ErrorKind;

    #[test]
    fn test_parse_built_cog() {
        let data = TiffBuilder::new(4, 4, 2, 2)
            .origin(600_000.0, 5_200_000.0, 10.0)
            .epsg(32632)
            .nodata(0)
            .fill(|x, y| (x + 10 * y) as u16)
            .build();

        let header = CogHeader::parse(Bytes::from(data)).unwrap();
        assert_eq!(header.data_type, DataType::U16);
        assert_eq!(header.compression, Compression::Deflate);
        assert_eq!(header.predictor, 2);
        assert_eq!(header.locator.image(), Dimensions::new(4, 4));
        assert_eq!(header.locator.tile(), Dimensions::new(2, 2));
        assert_eq!(header.nodata, Some(0.0));
        assert_eq!(header.geo.epsg_code, Some(32632));
        assert_eq!(header.tile_offsets.len(), 4);
        assert!(header.tile_range(3).is_ok());
        assert!(header.tile_range(4).is_err());
    }

    #[test]
    fn test_truncated_header_is_eof() {
        let data = TiffBuilder::new(4, 4, 2, 2).build();
        match CogHeader::parse(Bytes::from(data[..40].to_vec())) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_tile_offsets_fail_cleanly() {
        let data = bigtiff_with_tile_offsets(1 << 45);
        match CogHeader::parse(Bytes::from(data)) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_huge_tiles_rejected() {
        let data = bigtiff(
            &[
                (tags::IMAGE_WIDTH, field_types::LONG, 1, 1 << 20),
                (tags::IMAGE_LENGTH, field_types::LONG, 1, 1 << 20),
                (tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 16),
                (tags::TILE_WIDTH, field_types::LONG, 1, 1 << 20),
                (tags::TILE_LENGTH, field_types::LONG, 1, 1 << 20),
            ],
            256,
        );
        assert!(matches!(CogHeader::parse(Bytes::from(data)), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_decoder_round_trip_through_tiles() {
        let data = TiffBuilder::new(4, 4, 2, 2)
            .fill(|x, y| (x + 10 * y) as u16)
            .build();
        let header = CogHeader::parse(Bytes::from(data.clone())).unwrap();
        let decoder = header.decoder().unwrap();

        let (offset, length) = header.tile_range(3).unwrap();
        let tile = &data[offset as usize..(offset + length) as usize];
        // Tile 3 covers x 2..4, y 2..4
        assert_eq!(decoder.decode(tile).unwrap(), vec![22.0, 23.0, 32.0, 33.0]);
    }
}
