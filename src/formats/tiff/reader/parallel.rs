//! Parallel tile decoding

use std::collections::HashMap;
use bytes::Bytes;
use rayon::prelude::*;
use crate::error::Result;
use super::tiles::TileDecoder;

/// Decodes fetched tiles on the rayon pool
pub struct ParallelDecoder;

impl ParallelDecoder {
    /// Decodes `(tile_index, compressed bytes)` pairs in parallel
    ///
    /// Fails with the first decode error encountered.
    pub fn decode_tiles(
        decoder: &TileDecoder,
        tiles: Vec<(usize, Bytes)>,
    ) -> Result<HashMap<usize, Vec<f64>>> {
        tiles
            .into_par_iter()
            .map(|(tile_idx, compressed)| {
                decoder.decode(&compressed).map(|values| (tile_idx, values))
            })
            .collect()
    }
}
