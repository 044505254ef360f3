//! Tile decoding: decompression, predictor reversal and sample conversion

use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::compression::Compression;
use crate::types::{DataType, Dimensions};

/// Undo horizontal differencing for samples `sample_size` bytes wide
///
/// Samples are accumulated with wrapping arithmetic in the file's byte
/// order, one row at a time.
fn apply_horizontal_predictor(
    data: &mut [u8],
    width: usize,
    height: usize,
    sample_size: usize,
    order: ByteOrder,
) {
    let row_len = width * sample_size;
    let mask = if sample_size >= 8 { u64::MAX } else { (1u64 << (sample_size * 8)) - 1 };

    for row in 0..height {
        let start = row * row_len;
        let end = (start + row_len).min(data.len());
        if start >= end {
            break;
        }
        let row_data = &mut data[start..end];

        if sample_size == 1 {
            for i in 1..row_data.len() {
                row_data[i] = row_data[i].wrapping_add(row_data[i - 1]);
            }
            continue;
        }

        let mut prev = order.read_uint(row_data, sample_size);
        let mut i = sample_size;
        while i + sample_size <= row_data.len() {
            let value = order.read_uint(&row_data[i..], sample_size).wrapping_add(prev) & mask;
            order.write_uint(value, sample_size, &mut row_data[i..]);
            prev = value;
            i += sample_size;
        }
    }
}

/// Decodes compressed tiles of one image into f64 samples
#[derive(Debug, Clone, Copy)]
pub struct TileDecoder {
    compression: Compression,
    predictor: u64,
    data_type: DataType,
    byte_order: ByteOrder,
    tile_dims: Dimensions,
}

impl TileDecoder {
    /// Creates a decoder, rejecting predictors that cannot be reversed
    pub fn new(
        compression: Compression,
        predictor: u64,
        data_type: DataType,
        byte_order: ByteOrder,
        tile_dims: Dimensions,
    ) -> Result<Self> {
        match predictor {
            1 => {}
            2 if data_type.is_integer() => {}
            other => {
                return Err(Error::Unsupported(format!(
                    "Predictor {} for {:?} samples",
                    other, data_type
                )))
            }
        }

        Ok(Self {
            compression,
            predictor,
            data_type,
            byte_order,
            tile_dims,
        })
    }

    /// Number of samples in a decoded tile
    pub fn samples_per_tile(&self) -> usize {
        self.tile_dims.pixel_count() as usize
    }

    /// Decodes one tile into row-major samples
    ///
    /// An empty buffer denotes a sparse tile and decodes to all-NaN.
    pub fn decode(&self, compressed: &[u8]) -> Result<Vec<f64>> {
        let count = self.samples_per_tile();
        if compressed.is_empty() {
            return Ok(vec![f64::NAN; count]);
        }

        let sample_size = self.data_type.size();
        let expected_len = count * sample_size;
        let mut data = self.compression.decompress(compressed, expected_len)?;

        if data.len() < expected_len {
            return Err(Error::InvalidFormat(format!(
                "Tile decoded to {} bytes, expected {}",
                data.len(),
                expected_len
            )));
        }

        if self.predictor == 2 {
            apply_horizontal_predictor(
                &mut data,
                self.tile_dims.width as usize,
                self.tile_dims.height as usize,
                sample_size,
                self.byte_order,
            );
        }

        Ok(data[..expected_len]
            .chunks_exact(sample_size)
            .map(|sample| self.data_type.decode(sample, self.byte_order))
            .collect())
    }
}
