//! I/O primitives for reading remote raster headers and tiles

pub mod traits;
pub mod byte_order;
pub mod range;

pub use traits::SeekableReader;
pub use byte_order::ByteOrder;
pub use range::{ByteSource, HttpByteSource};
