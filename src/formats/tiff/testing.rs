//! In-memory tiled GeoTIFF builder for tests

use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression as Level;
use crate::io::ByteOrder;
use super::tags::{self, field_types};

/// Builds single-band u16 tiled GeoTIFFs laid out like a COG
/// (header and IFD first, tile data last)
pub struct TiffBuilder {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    byte_order: ByteOrder,
    deflate: bool,
    predictor: bool,
    origin: (f64, f64),
    pixel_size: f64,
    epsg: u16,
    nodata: Option<u16>,
    sparse: Vec<usize>,
    values: Vec<u16>,
}

struct Entry {
    tag: u16,
    field_type: u16,
    count: u32,
    payload: Vec<u8>,
}

impl TiffBuilder {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
            byte_order: ByteOrder::LittleEndian,
            deflate: true,
            predictor: true,
            origin: (0.0, 0.0),
            pixel_size: 1.0,
            epsg: 4326,
            nodata: None,
            sparse: Vec::new(),
            values: vec![0; (width * height) as usize],
        }
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn uncompressed(mut self) -> Self {
        self.deflate = false;
        self.predictor = false;
        self
    }

    /// Upper-left corner and square pixel size
    pub fn origin(mut self, x: f64, y: f64, pixel_size: f64) -> Self {
        self.origin = (x, y);
        self.pixel_size = pixel_size;
        self
    }

    pub fn epsg(mut self, epsg: u16) -> Self {
        self.epsg = epsg;
        self
    }

    pub fn nodata(mut self, value: u16) -> Self {
        self.nodata = Some(value);
        self
    }

    /// Writes a zero byte count for the tile
    pub fn sparse_tile(mut self, tile_index: usize) -> Self {
        self.sparse.push(tile_index);
        self
    }

    pub fn fill(mut self, f: impl Fn(u32, u32) -> u16) -> Self {
        for y in 0..self.height {
            for x in 0..self.width {
                self.values[(y * self.width + x) as usize] = f(x, y);
            }
        }
        self
    }

    fn uint_bytes(&self, values: &[u64], width: usize) -> Vec<u8> {
        let mut out = vec![0u8; values.len() * width];
        for (i, &v) in values.iter().enumerate() {
            self.byte_order.write_uint(v, width, &mut out[i * width..]);
        }
        out
    }

    fn double_bytes(&self, values: &[f64]) -> Vec<u8> {
        let bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
        self.uint_bytes(&bits, 8)
    }

    fn encode_tile(&self, tx: u32, ty: u32) -> Vec<u8> {
        let mut samples = Vec::with_capacity((self.tile_width * self.tile_height) as usize);
        for row in 0..self.tile_height {
            for col in 0..self.tile_width {
                let x = tx * self.tile_width + col;
                let y = ty * self.tile_height + row;
                let value = if x < self.width && y < self.height {
                    self.values[(y * self.width + x) as usize]
                } else {
                    0
                };
                samples.push(value);
            }
        }

        if self.predictor {
            for row in samples.chunks_mut(self.tile_width as usize) {
                for i in (1..row.len()).rev() {
                    row[i] = row[i].wrapping_sub(row[i - 1]);
                }
            }
        }

        let wide: Vec<u64> = samples.iter().map(|&v| v as u64).collect();
        let raw = self.uint_bytes(&wide, 2);

        if !self.deflate {
            return raw;
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Level::default());
        encoder.write_all(&raw).unwrap();
        encoder.finish().unwrap()
    }

    pub fn build(self) -> Vec<u8> {
        let tiles_across = self.width.div_ceil(self.tile_width);
        let tiles_down = self.height.div_ceil(self.tile_height);

        let mut tiles = Vec::new();
        for ty in 0..tiles_down {
            for tx in 0..tiles_across {
                let index = (ty * tiles_across + tx) as usize;
                if self.sparse.contains(&index) {
                    tiles.push(Vec::new());
                } else {
                    tiles.push(self.encode_tile(tx, ty));
                }
            }
        }
        let tile_count = tiles.len();

        let key_id = if self.epsg == 4326 { 2048 } else { 3072 };
        let geo_keys = [1u64, 1, 0, 1, key_id, 0, 1, self.epsg as u64];

        let mut entries = vec![
            Entry { tag: tags::IMAGE_WIDTH, field_type: field_types::LONG, count: 1, payload: self.uint_bytes(&[self.width as u64], 4) },
            Entry { tag: tags::IMAGE_LENGTH, field_type: field_types::LONG, count: 1, payload: self.uint_bytes(&[self.height as u64], 4) },
            Entry { tag: tags::BITS_PER_SAMPLE, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[16], 2) },
            Entry { tag: tags::COMPRESSION, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[if self.deflate { 8 } else { 1 }], 2) },
            Entry { tag: tags::SAMPLES_PER_PIXEL, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[1], 2) },
            Entry { tag: tags::PLANAR_CONFIGURATION, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[1], 2) },
            Entry { tag: tags::PREDICTOR, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[if self.predictor { 2 } else { 1 }], 2) },
            Entry { tag: tags::TILE_WIDTH, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[self.tile_width as u64], 2) },
            Entry { tag: tags::TILE_LENGTH, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[self.tile_height as u64], 2) },
            Entry { tag: tags::TILE_OFFSETS, field_type: field_types::LONG, count: tile_count as u32, payload: vec![0u8; tile_count * 4] },
            Entry {
                tag: tags::TILE_BYTE_COUNTS,
                field_type: field_types::LONG,
                count: tile_count as u32,
                payload: self.uint_bytes(&tiles.iter().map(|t| t.len() as u64).collect::<Vec<_>>(), 4),
            },
            Entry { tag: tags::SAMPLE_FORMAT, field_type: field_types::SHORT, count: 1, payload: self.uint_bytes(&[1], 2) },
            Entry { tag: tags::MODEL_PIXEL_SCALE, field_type: field_types::DOUBLE, count: 3, payload: self.double_bytes(&[self.pixel_size, self.pixel_size, 0.0]) },
            Entry {
                tag: tags::MODEL_TIEPOINT,
                field_type: field_types::DOUBLE,
                count: 6,
                payload: self.double_bytes(&[0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0]),
            },
            Entry { tag: tags::GEO_KEY_DIRECTORY, field_type: field_types::SHORT, count: 8, payload: self.uint_bytes(&geo_keys, 2) },
        ];

        if let Some(nodata) = self.nodata {
            let mut text = nodata.to_string().into_bytes();
            text.push(0);
            entries.push(Entry { tag: tags::GDAL_NODATA, field_type: field_types::ASCII, count: text.len() as u32, payload: text });
        }

        // Lay out out-of-line payloads after the IFD, then the tiles
        let ifd_len = 2 + 12 * entries.len() + 4;
        let mut cursor = 8 + ifd_len;
        let mut positions = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.payload.len() > 4 {
                positions.push(Some(cursor));
                cursor += entry.payload.len();
                cursor += cursor % 2;
            } else {
                positions.push(None);
            }
        }

        let mut tile_offsets = Vec::with_capacity(tile_count);
        for tile in &tiles {
            tile_offsets.push(cursor as u64);
            cursor += tile.len();
        }
        let offsets_payload = self.uint_bytes(&tile_offsets, 4);
        if let Some(entry) = entries.iter_mut().find(|e| e.tag == tags::TILE_OFFSETS) {
            entry.payload = offsets_payload;
        }

        let order = self.byte_order;
        let mut out = Vec::with_capacity(cursor);
        out.extend_from_slice(match order {
            ByteOrder::LittleEndian => b"II",
            ByteOrder::BigEndian => b"MM",
        });
        out.extend_from_slice(&self.uint_bytes(&[42], 2));
        out.extend_from_slice(&self.uint_bytes(&[8], 4));

        out.extend_from_slice(&self.uint_bytes(&[entries.len() as u64], 2));
        for (entry, position) in entries.iter().zip(&positions) {
            out.extend_from_slice(&self.uint_bytes(&[entry.tag as u64, entry.field_type as u64], 2));
            out.extend_from_slice(&self.uint_bytes(&[entry.count as u64], 4));
            match position {
                Some(pos) => out.extend_from_slice(&self.uint_bytes(&[*pos as u64], 4)),
                None => {
                    let mut inline = [0u8; 4];
                    inline[..entry.payload.len()].copy_from_slice(&entry.payload);
                    out.extend_from_slice(&inline);
                }
            }
        }
        out.extend_from_slice(&[0u8; 4]);

        for (entry, position) in entries.iter().zip(&positions) {
            if let Some(pos) = position {
                out.resize(*pos, 0);
                out.extend_from_slice(&entry.payload);
            }
        }
        for (tile, offset) in tiles.iter().zip(&tile_offsets) {
            out.resize(*offset as usize, 0);
            out.extend_from_slice(tile);
        }

        out
    }
}

/// Little-endian BigTIFF holding one IFD of `(tag, type, count, value)`
/// entries, zero-padded to `len` bytes
pub fn bigtiff(entries: &[(u16, u16, u64, u64)], len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(b"II");
    data.extend_from_slice(&43u16.to_le_bytes());
    data.extend_from_slice(&8u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&16u64.to_le_bytes());

    data.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    for &(tag, field_type, count, value) in entries {
        data.extend_from_slice(&tag.to_le_bytes());
        data.extend_from_slice(&field_type.to_le_bytes());
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&0u64.to_le_bytes());

    data.resize(len.max(data.len()), 0);
    data
}

/// 4x4 u16 BigTIFF whose TileOffsets entry claims `tile_offset_count` values
pub fn bigtiff_with_tile_offsets(tile_offset_count: u64) -> Vec<u8> {
    bigtiff(
        &[
            (tags::IMAGE_WIDTH, field_types::LONG, 1, 4),
            (tags::IMAGE_LENGTH, field_types::LONG, 1, 4),
            (tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 16),
            (tags::TILE_WIDTH, field_types::SHORT, 1, 2),
            (tags::TILE_LENGTH, field_types::SHORT, 1, 2),
            (tags::TILE_OFFSETS, field_types::LONG8, tile_offset_count, 200),
            (tags::TILE_BYTE_COUNTS, field_types::LONG8, 4, 300),
        ],
        400,
    )
}
