//! Byte order (endianness) handling
//!
//! TIFF headers and tile samples may be little- or big-endian. Header values
//! are read from a [`SeekableReader`]; decoded tile samples are read from
//! byte slices.

use std::io::{self, Result};
use crate::io::SeekableReader;

/// Represents the byte order (endianness) of binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (least significant byte first)
    LittleEndian,
    /// Big-endian byte order (most significant byte first)
    BigEndian,
}

impl ByteOrder {
    /// Detects byte order from TIFF magic bytes
    ///
    /// TIFF files start with either "II" (0x4949) for little-endian
    /// or "MM" (0x4D4D) for big-endian.
    pub fn from_tiff_magic(magic: [u8; 2]) -> Option<Self> {
        match &magic {
            b"II" => Some(ByteOrder::LittleEndian),
            b"MM" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// Reads and detects byte order from a reader
    pub fn detect<R: SeekableReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;

        Self::from_tiff_magic(magic).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid byte order magic bytes: {:02X}{:02X}", magic[0], magic[1])
            )
        })
    }

    /// Reads an unsigned 16-bit integer
    pub fn read_u16<R: SeekableReader + ?Sized>(&self, reader: &mut R) -> Result<u16> {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok(self.u16_from(&buf))
    }

    /// Reads an unsigned 32-bit integer
    pub fn read_u32<R: SeekableReader + ?Sized>(&self, reader: &mut R) -> Result<u32> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(self.u32_from(&buf))
    }

    /// Reads an unsigned 64-bit integer
    pub fn read_u64<R: SeekableReader + ?Sized>(&self, reader: &mut R) -> Result<u64> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(self.u64_from(&buf))
    }

    /// Reads a 32-bit floating point number
    pub fn read_f32<R: SeekableReader + ?Sized>(&self, reader: &mut R) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32(reader)?))
    }

    /// Reads a 64-bit floating point number
    pub fn read_f64<R: SeekableReader + ?Sized>(&self, reader: &mut R) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64(reader)?))
    }

    /// Interprets the first two bytes of `bytes`
    pub fn u16_from(&self, bytes: &[u8]) -> u16 {
        let buf = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(buf),
            ByteOrder::BigEndian => u16::from_be_bytes(buf),
        }
    }

    /// Interprets the first four bytes of `bytes`
    pub fn u32_from(&self, bytes: &[u8]) -> u32 {
        let buf = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(buf),
            ByteOrder::BigEndian => u32::from_be_bytes(buf),
        }
    }

    /// Interprets the first eight bytes of `bytes`
    pub fn u64_from(&self, bytes: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[..8]);
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(buf),
            ByteOrder::BigEndian => u64::from_be_bytes(buf),
        }
    }

    /// Writes `value` into the first `width` bytes of `out`
    pub fn write_uint(&self, value: u64, width: usize, out: &mut [u8]) {
        match self {
            ByteOrder::LittleEndian => out[..width].copy_from_slice(&value.to_le_bytes()[..width]),
            ByteOrder::BigEndian => out[..width].copy_from_slice(&value.to_be_bytes()[8 - width..]),
        }
    }

    /// Reads the first `width` bytes of `bytes` as an unsigned integer
    pub fn read_uint(&self, bytes: &[u8], width: usize) -> u64 {
        match width {
            1 => bytes[0] as u64,
            2 => self.u16_from(bytes) as u64,
            4 => self.u32_from(bytes) as u64,
            _ => self.u64_from(bytes),
        }
    }
}
