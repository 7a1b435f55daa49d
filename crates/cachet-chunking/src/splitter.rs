//! Byte-stream splitter producing content-defined chunks.

use crate::params::SplitParams;
use crate::rolling::RollingHash;

/// A single chunk of the input with its byte offset.
///
/// Chunks borrow from the input slice; callers that need ownership copy the
/// slice after deciding the chunk is worth storing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Byte offset of this chunk within the input.
    pub offset: u64,
    /// The chunk's bytes.
    pub data: &'a [u8],
}

/// Content-defined splitter for leaf-level chunking.
///
/// Boundaries are decided by a Rabin-Karp rolling hash (see
/// [`RollingHash`]): a chunk ends at the first position past `min_size`
/// where the hash matches the boundary mask, or at `max_size` if the mask
/// never matches. The final chunk may be shorter than `min_size`.
///
/// Splitting is a pure function of the input bytes and the parameters;
/// it cannot fail, and the same input always yields the same chunks.
pub struct ContentSplitter {
    params: SplitParams,
}

impl ContentSplitter {
    /// Create a splitter targeting the given average chunk size.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size < 16` (see [`SplitParams::from_chunk_size`]).
    pub fn from_chunk_size(chunk_size: u32) -> Self {
        Self {
            params: SplitParams::from_chunk_size(chunk_size),
        }
    }

    /// The derived boundary parameters.
    pub fn params(&self) -> SplitParams {
        self.params
    }

    /// Split `data` into content-defined chunks, lazily.
    ///
    /// The returned iterator yields chunks in input order and does no work
    /// until polled. Empty input yields no chunks.
    pub fn split<'a>(&self, data: &'a [u8]) -> Chunks<'a> {
        Chunks {
            data,
            pos: 0,
            params: self.params,
            hash: RollingHash::new(),
        }
    }
}

/// Lazy iterator over the chunks of one input, created by
/// [`ContentSplitter::split`].
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    params: SplitParams,
    hash: RollingHash,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let data = self.data;
        if self.pos >= data.len() {
            return None;
        }

        let start = self.pos;
        let mut end = data.len();

        for (i, &byte) in data[start..].iter().enumerate() {
            let hash = self.hash.push(byte);
            let len = i + 1;
            if len >= self.params.max_size()
                || (len >= self.params.min_size() && self.params.hash_matches(hash))
            {
                end = start + len;
                break;
            }
        }

        self.pos = end;
        Some(Chunk {
            offset: start as u64,
            data: &data[start..end],
        })
    }
}
