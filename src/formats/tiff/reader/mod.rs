//! TIFF header reader over in-memory byte ranges

pub mod tags;
pub mod tiles;
pub mod pixels;
pub mod parallel;

use std::io::{Cursor, Read, Seek, SeekFrom};
use bytes::Bytes;
use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::formats::tiff::{IFD, IFDEntry, TIFF_MAGIC, BIGTIFF_MAGIC};

use self::tags::TagReader;

pub use self::tiles::TileDecoder;
pub use self::pixels::PixelLocator;
pub use self::parallel::ParallelDecoder;

/// Reads TIFF structures from the leading bytes of a file
///
/// Only the bytes handed to [`TiffReader::from_bytes`] are visible. Any
/// structure that points beyond them fails with an `UnexpectedEof` I/O
/// error so callers can fetch a longer prefix and retry.
pub struct TiffReader {
    reader: Cursor<Bytes>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
}

impl TiffReader {
    /// Parses the file header from a buffer starting at byte 0
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let mut reader = Cursor::new(data);

        let byte_order = ByteOrder::detect(&mut reader)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        let magic = byte_order.read_u16(&mut reader)?;

        let is_big_tiff = match magic {
            TIFF_MAGIC => false,
            BIGTIFF_MAGIC => true,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        if is_big_tiff {
            let offset_size = byte_order.read_u16(&mut reader)?;
            if offset_size != 8 {
                return Err(Error::InvalidFormat(
                    format!("Invalid BigTIFF offset size: {}", offset_size)
                ));
            }
            let _reserved = byte_order.read_u16(&mut reader)?;
        }

        Ok(Self {
            reader,
            byte_order,
            is_big_tiff,
        })
    }

    /// Byte order of the file
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Whether the file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads the first IFD, which holds the full-resolution image of a COG
    pub fn read_main_ifd(&mut self) -> Result<IFD> {
        let header_len = if self.is_big_tiff { 8 } else { 4 };
        self.reader.seek(SeekFrom::Start(header_len))?;

        let offset = if self.is_big_tiff {
            self.byte_order.read_u64(&mut self.reader)?
        } else {
            self.byte_order.read_u32(&mut self.reader)? as u64
        };

        if offset == 0 {
            return Err(Error::InvalidFormat("File contains no IFD".to_string()));
        }

        self.read_ifd(0, offset)
    }

    /// Reads a single IFD at the given offset
    fn read_ifd(&mut self, number: usize, offset: u64) -> Result<IFD> {
        let order = self.byte_order;
        let reader = &mut self.reader;

        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            order.read_u64(reader)?
        } else {
            order.read_u16(reader)? as u64
        };

        let mut ifd = IFD::with_byte_order(number, offset, order);

        for _ in 0..entry_count {
            let tag = order.read_u16(reader)?;
            let field_type = order.read_u16(reader)?;

            let count = if self.is_big_tiff {
                order.read_u64(reader)?
            } else {
                order.read_u32(reader)? as u64
            };

            let mut raw = [0u8; 8];
            let value_len = if self.is_big_tiff { 8 } else { 4 };
            reader.read_exact(&mut raw[..value_len])?;

            ifd.add_entry(IFDEntry::from_raw(tag, field_type, count, raw, order, self.is_big_tiff));
        }

        Ok(ifd)
    }

    fn tag_reader(&mut self) -> TagReader<'_, Cursor<Bytes>> {
        TagReader::new(&mut self.reader, self.byte_order, self.is_big_tiff)
    }

    /// Reads tag values as f64 array
    pub fn read_tag_doubles(&mut self, entry: &IFDEntry) -> Result<Vec<f64>> {
        self.tag_reader().read_doubles(entry)
    }

    /// Reads tag values as u16 array
    pub fn read_tag_u16s(&mut self, entry: &IFDEntry) -> Result<Vec<u16>> {
        self.tag_reader().read_u16s(entry)
    }

    /// Reads unsigned integer tag values as u64 array
    pub fn read_tag_u64s(&mut self, entry: &IFDEntry) -> Result<Vec<u64>> {
        self.tag_reader().read_u64s(entry)
    }

    /// Reads ASCII string from tag
    pub fn read_tag_ascii(&mut self, entry: &IFDEntry) -> Result<String> {
        self.tag_reader().read_ascii(entry)
    }
}
