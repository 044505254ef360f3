//! TIFF tile compression codecs

pub mod deflate;

use crate::error::{Error, Result};

/// Compression schemes found in reflectance COGs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Deflate/ZIP compression (tag 8, or the legacy Adobe code 32946)
    Deflate,
}

impl Compression {
    /// Creates compression from TIFF compression tag value
    pub fn from_tag(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Compression::None),
            8 | 32946 => Ok(Compression::Deflate),
            _ => Err(Error::Unsupported(format!("Compression type {}", value))),
        }
    }

    /// Decompresses one tile, pre-sizing the output to `expected_len`
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Deflate => deflate::decompress(data, expected_len),
        }
    }
}
