//! Core I/O traits

use std::io::{Read, Seek};

/// Trait for readers that support both reading and seeking operations
///
/// Header parsing runs over in-memory buffers fetched by range requests,
/// so any `Cursor` over bytes qualifies.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
