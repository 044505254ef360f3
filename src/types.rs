//! Core raster data types

use crate::io::ByteOrder;

/// Represents pixel sample types found in reflectance COGs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DataType {
    /// Maps TIFF SampleFormat and BitsPerSample to a data type
    pub fn from_tiff(sample_format: u64, bits: u64) -> Option<Self> {
        match (sample_format, bits) {
            (1, 8) => Some(DataType::U8),
            (1, 16) => Some(DataType::U16),
            (1, 32) => Some(DataType::U32),
            (2, 8) => Some(DataType::I8),
            (2, 16) => Some(DataType::I16),
            (2, 32) => Some(DataType::I32),
            (3, 32) => Some(DataType::F32),
            (3, 64) => Some(DataType::F64),
            _ => None,
        }
    }

    /// Returns the size in bytes for this data type
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }

    /// Returns whether the type holds integer samples
    pub fn is_integer(&self) -> bool {
        !matches!(self, DataType::F32 | DataType::F64)
    }

    /// Decodes one sample from `bytes` (exactly `size()` long) as f64
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> f64 {
        match self {
            DataType::U8 => bytes[0] as f64,
            DataType::I8 => bytes[0] as i8 as f64,
            DataType::U16 => order.u16_from(bytes) as f64,
            DataType::I16 => order.u16_from(bytes) as i16 as f64,
            DataType::U32 => order.u32_from(bytes) as f64,
            DataType::I32 => order.u32_from(bytes) as i32 as f64,
            DataType::F32 => f32::from_bits(order.u32_from(bytes)) as f64,
            DataType::F64 => f64::from_bits(order.u64_from(bytes)),
        }
    }
}

/// Represents image or tile dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u64,
    /// Height in pixels
    pub height: u64,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> u64 {
        self.width * self.height
    }
}
