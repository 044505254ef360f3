//! Tag value reading operations

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use crate::error::{Error, Result};
use crate::io::{ByteOrder, SeekableReader};
use crate::formats::tiff::IFDEntry;
use crate::formats::tiff::tags::field_types;

/// Reads tag values either from the inline value field or from the
/// offset they point to
pub struct TagReader<'a, R: SeekableReader + ?Sized> {
    reader: &'a mut R,
    byte_order: ByteOrder,
    is_big_tiff: bool,
}

impl<'a, R: SeekableReader + ?Sized> TagReader<'a, R> {
    pub fn new(reader: &'a mut R, byte_order: ByteOrder, is_big_tiff: bool) -> Self {
        Self {
            reader,
            byte_order,
            is_big_tiff,
        }
    }

    /// Reads tag values as f64 array
    ///
    /// Accepts DOUBLE, FLOAT and RATIONAL fields.
    pub fn read_doubles(&mut self, entry: &IFDEntry) -> Result<Vec<f64>> {
        let bytes = self.value_bytes(entry)?;
        let order = self.byte_order;

        let values = match entry.field_type {
            field_types::DOUBLE => bytes
                .chunks_exact(8)
                .map(|c| f64::from_bits(order.u64_from(c)))
                .collect(),
            field_types::FLOAT => bytes
                .chunks_exact(4)
                .map(|c| f32::from_bits(order.u32_from(c)) as f64)
                .collect(),
            field_types::RATIONAL => bytes
                .chunks_exact(8)
                .map(|c| {
                    let num = order.u32_from(&c[..4]) as f64;
                    let den = order.u32_from(&c[4..]) as f64;
                    if den == 0.0 { f64::NAN } else { num / den }
                })
                .collect(),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Tag {} has type {}, expected DOUBLE or FLOAT",
                    entry.tag, other
                )))
            }
        };

        Ok(values)
    }

    /// Reads unsigned integer tag values, widened to u64
    pub fn read_u64s(&mut self, entry: &IFDEntry) -> Result<Vec<u64>> {
        let width = match entry.field_type {
            field_types::BYTE | field_types::UNDEFINED => 1,
            field_types::SHORT => 2,
            field_types::LONG | field_types::IFD => 4,
            field_types::LONG8 | field_types::IFD8 => 8,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Tag {} has type {}, expected an unsigned integer",
                    entry.tag, other
                )))
            }
        };

        let bytes = self.value_bytes(entry)?;
        let order = self.byte_order;
        Ok(bytes.chunks_exact(width).map(|c| order.read_uint(c, width)).collect())
    }

    /// Reads SHORT tag values
    pub fn read_u16s(&mut self, entry: &IFDEntry) -> Result<Vec<u16>> {
        if entry.field_type != field_types::SHORT {
            return Err(Error::InvalidFormat(format!(
                "Tag {} has type {}, expected SHORT",
                entry.tag, entry.field_type
            )));
        }
        Ok(self.read_u64s(entry)?.into_iter().map(|v| v as u16).collect())
    }

    /// Reads ASCII string from tag
    pub fn read_ascii(&mut self, entry: &IFDEntry) -> Result<String> {
        let bytes = self.value_bytes(entry)?;
        let s = String::from_utf8_lossy(&bytes)
            .trim_end_matches('\0')
            .to_string();
        Ok(s)
    }

    /// Returns the raw bytes of all values of an entry
    ///
    /// Values that reach past the end of the visible bytes fail with
    /// `UnexpectedEof` before anything is allocated.
    fn value_bytes(&mut self, entry: &IFDEntry) -> Result<Vec<u8>> {
        let len = entry.byte_len().ok_or_else(|| {
            Error::InvalidFormat(format!("Tag {} has {} values", entry.tag, entry.count))
        })?;

        if entry.is_inline(self.is_big_tiff) {
            let mut bytes = vec![0u8; len as usize];
            let mut inline = Cursor::new(&entry.raw[..]);
            inline.read_exact(&mut bytes)?;
            return Ok(bytes);
        }

        let available = self.reader.seek(SeekFrom::End(0))?;
        let end = entry.value_offset.checked_add(len);
        if end.map_or(true, |end| end > available) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Tag {} needs {} bytes at offset {}, {} available",
                    entry.tag, len, entry.value_offset, available
                ),
            )
            .into());
        }

        let mut bytes = vec![0u8; len as usize];
        self.reader.seek(SeekFrom::Start(entry.value_offset))?;
        self.reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_read_u16s_inline() {
        let mut reader = Cursor::new(vec![0u8; 16]);
        let entry = IFDEntry::new(258, field_types::SHORT, 2, 0x00020001);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);

        let values = tag_reader.read_u16s(&entry).unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_read_u16s_inline_big_endian() {
        let mut reader = Cursor::new(vec![0u8; 16]);
        let raw = [0x00, 0x01, 0x00, 0x02, 0, 0, 0, 0];
        let entry = IFDEntry::from_raw(258, field_types::SHORT, 2, raw, ByteOrder::BigEndian, false);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::BigEndian, false);

        assert_eq!(tag_reader.read_u16s(&entry).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_read_long_offsets() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&200u32.to_le_bytes());
        data.extend_from_slice(&300u32.to_le_bytes());
        let mut reader = Cursor::new(data);

        let entry = IFDEntry::new(324, field_types::LONG, 3, 4);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);
        assert_eq!(tag_reader.read_u64s(&entry).unwrap(), vec![100, 200, 300]);
    }

    #[test]
    fn test_read_ascii_inline() {
        let mut reader = Cursor::new(vec![0u8; 16]);
        let value = u32::from_le_bytes(*b"0\0\0\0") as u64;
        let entry = IFDEntry::new(42113, field_types::ASCII, 2, value);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);

        assert_eq!(tag_reader.read_ascii(&entry).unwrap(), "0");
    }

    #[test]
    fn test_read_doubles_non_inline() {
        let mut data = vec![];
        data.extend_from_slice(&10.0f64.to_le_bytes());
        data.extend_from_slice(&10.0f64.to_le_bytes());
        data.extend_from_slice(&0.0f64.to_le_bytes());
        let mut reader = Cursor::new(data);

        let entry = IFDEntry::new(33550, field_types::DOUBLE, 3, 0);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);

        assert_eq!(tag_reader.read_doubles(&entry).unwrap(), vec![10.0, 10.0, 0.0]);
    }

    #[test]
    fn test_values_past_buffer_end_are_eof() {
        let mut reader = Cursor::new(vec![0u8; 8]);
        let entry = IFDEntry::new(324, field_types::LONG, 4, 64);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);

        match tag_reader.read_u64s(&entry) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let mut reader = Cursor::new(vec![0u8; 64]);
        let entry = IFDEntry::new(324, field_types::LONG8, 1 << 45, 16);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, true);

        match tag_reader.read_u64s(&entry) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {other:?}"),
        }

        let overflowing = IFDEntry::new(324, field_types::LONG8, u64::MAX / 4, 16);
        assert!(matches!(tag_reader.read_u64s(&overflowing), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let mut reader = Cursor::new(vec![0u8; 8]);
        let entry = IFDEntry::new(33550, field_types::SHORT, 1, 0);
        let mut tag_reader = TagReader::new(&mut reader, ByteOrder::LittleEndian, false);
        assert!(tag_reader.read_doubles(&entry).is_err());
    }
}
