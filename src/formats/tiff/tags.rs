//! TIFF tag constants used by the COG reader

/// Image width in pixels
pub const IMAGE_WIDTH: u16 = 256;

/// Image height in pixels
pub const IMAGE_LENGTH: u16 = 257;

/// Bits per sample
pub const BITS_PER_SAMPLE: u16 = 258;

/// Compression scheme
pub const COMPRESSION: u16 = 259;

/// Samples per pixel
pub const SAMPLES_PER_PIXEL: u16 = 277;

/// Planar configuration
pub const PLANAR_CONFIGURATION: u16 = 284;

/// Predictor
pub const PREDICTOR: u16 = 317;

/// Tile width
pub const TILE_WIDTH: u16 = 322;

/// Tile length
pub const TILE_LENGTH: u16 = 323;

/// Tile offsets
pub const TILE_OFFSETS: u16 = 324;

/// Tile byte counts
pub const TILE_BYTE_COUNTS: u16 = 325;

/// Sample format
pub const SAMPLE_FORMAT: u16 = 339;

/// GeoTIFF ModelPixelScaleTag
pub const MODEL_PIXEL_SCALE: u16 = 33550;

/// GeoTIFF ModelTiepointTag
pub const MODEL_TIEPOINT: u16 = 33922;

/// GeoTIFF ModelTransformationTag
pub const MODEL_TRANSFORMATION: u16 = 34264;

/// GeoTIFF GeoKeyDirectoryTag
pub const GEO_KEY_DIRECTORY: u16 = 34735;

/// GDAL no data value (ASCII)
pub const GDAL_NODATA: u16 = 42113;

/// Returns the name of a TIFF tag
pub fn tag_name(tag: u16) -> &'static str {
    match tag {
        IMAGE_WIDTH => "ImageWidth",
        IMAGE_LENGTH => "ImageLength",
        BITS_PER_SAMPLE => "BitsPerSample",
        COMPRESSION => "Compression",
        SAMPLES_PER_PIXEL => "SamplesPerPixel",
        PLANAR_CONFIGURATION => "PlanarConfiguration",
        PREDICTOR => "Predictor",
        TILE_WIDTH => "TileWidth",
        TILE_LENGTH => "TileLength",
        TILE_OFFSETS => "TileOffsets",
        TILE_BYTE_COUNTS => "TileByteCounts",
        SAMPLE_FORMAT => "SampleFormat",
        MODEL_PIXEL_SCALE => "ModelPixelScale",
        MODEL_TIEPOINT => "ModelTiepoint",
        MODEL_TRANSFORMATION => "ModelTransformation",
        GEO_KEY_DIRECTORY => "GeoKeyDirectory",
        GDAL_NODATA => "GDAL_NODATA",
        _ => "Unknown",
    }
}

/// Field type constants
pub mod field_types {
    /// BYTE (8-bit unsigned)
    pub const BYTE: u16 = 1;
    /// ASCII string
    pub const ASCII: u16 = 2;
    /// SHORT (16-bit unsigned)
    pub const SHORT: u16 = 3;
    /// LONG (32-bit unsigned)
    pub const LONG: u16 = 4;
    /// RATIONAL (two LONGs)
    pub const RATIONAL: u16 = 5;
    /// SBYTE (8-bit signed)
    pub const SBYTE: u16 = 6;
    /// UNDEFINED (8-bit)
    pub const UNDEFINED: u16 = 7;
    /// SSHORT (16-bit signed)
    pub const SSHORT: u16 = 8;
    /// SLONG (32-bit signed)
    pub const SLONG: u16 = 9;
    /// SRATIONAL (two SLONGs)
    pub const SRATIONAL: u16 = 10;
    /// FLOAT (32-bit IEEE float)
    pub const FLOAT: u16 = 11;
    /// DOUBLE (64-bit IEEE double)
    pub const DOUBLE: u16 = 12;
    /// IFD (32-bit IFD offset)
    pub const IFD: u16 = 13;
    /// LONG8 (64-bit unsigned, BigTIFF)
    pub const LONG8: u16 = 16;
    /// SLONG8 (64-bit signed, BigTIFF)
    pub const SLONG8: u16 = 17;
    /// IFD8 (64-bit IFD offset, BigTIFF)
    pub const IFD8: u16 = 18;
}
