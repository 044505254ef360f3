//! Image File Directory (IFD) structures

use std::collections::HashMap;
use crate::io::ByteOrder;
use crate::types::{DataType, Dimensions};
use super::tags;

/// Represents an Image File Directory entry
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Offset to the values when they are not stored inline
    pub value_offset: u64,
    /// Raw value field as it appears in the file (4 or 8 bytes used)
    pub raw: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry from an already decoded value field
    ///
    /// The raw field is laid out little-endian, matching `IFD::new`.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry from the raw value field read from a file
    pub fn from_raw(tag: u16, field_type: u16, count: u64, raw: [u8; 8], order: ByteOrder, is_big_tiff: bool) -> Self {
        let value_offset = if is_big_tiff {
            order.u64_from(&raw)
        } else {
            order.u32_from(&raw) as u64
        };

        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw,
        }
    }

    /// Returns the size in bytes of this field type
    pub fn field_type_size(&self) -> usize {
        use super::tags::field_types::*;
        match self.field_type {
            BYTE | ASCII | SBYTE | UNDEFINED => 1,
            SHORT | SSHORT => 2,
            LONG | SLONG | FLOAT => 4,
            RATIONAL | SRATIONAL | DOUBLE | LONG8 | SLONG8 | IFD8 => 8,
            _ => 1,
        }
    }

    /// Total size in bytes of all values, `None` on overflow
    pub fn byte_len(&self) -> Option<u64> {
        (self.field_type_size() as u64).checked_mul(self.count)
    }

    /// Returns whether the value is stored inline (in the value field)
    pub fn is_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.byte_len().is_some_and(|len| len <= inline_size)
    }

    /// Decodes the first inline integer value
    pub fn first_inline_value(&self, order: ByteOrder) -> u64 {
        order.read_uint(&self.raw, self.field_type_size())
    }
}

/// Represents an Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in file
    pub offset: u64,
    /// Byte order of the file this IFD was read from
    pub byte_order: ByteOrder,
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// Tag map for quick lookup
    tag_map: HashMap<u16, usize>,
}

impl IFD {
    /// Creates a new little-endian IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self::with_byte_order(number, offset, ByteOrder::LittleEndian)
    }

    /// Creates a new IFD for a file with the given byte order
    pub fn with_byte_order(number: usize, offset: u64, byte_order: ByteOrder) -> Self {
        Self {
            number,
            offset,
            byte_order,
            entries: Vec::new(),
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        let index = self.entries.len();
        self.tag_map.insert(entry.tag, index);
        self.entries.push(entry);
    }

    /// Gets an entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// Gets the first value of a single-valued integer tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|e| e.first_inline_value(self.byte_order))
    }

    /// Returns image dimensions if available
    pub fn dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Returns tile dimensions if tiled
    pub fn tile_dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::TILE_WIDTH)?;
        let height = self.get_tag_value(tags::TILE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Returns compression tag value (1 when absent)
    pub fn compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    /// Returns predictor tag value (1 when absent)
    pub fn predictor(&self) -> u64 {
        self.get_tag_value(tags::PREDICTOR).unwrap_or(1)
    }

    /// Returns samples per pixel
    pub fn samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Returns planar configuration (1 = chunky)
    pub fn planar_configuration(&self) -> u64 {
        self.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(1)
    }

    /// Determines the pixel data type based on TIFF tags
    pub fn data_type(&self) -> Option<DataType> {
        let bits = self.get_tag_value(tags::BITS_PER_SAMPLE)?;
        let format = self.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(1);
        DataType::from_tiff(format, bits)
    }

    /// Returns whether this IFD represents a tiled image
    pub fn is_tiled(&self) -> bool {
        self.get_entry(tags::TILE_WIDTH).is_some()
    }

    /// Returns number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
