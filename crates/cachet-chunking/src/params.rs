//! Boundary predicate parameters shared by the content and record splitters.

/// Chunk boundary parameters derived from a target average chunk size.
///
/// A boundary is declared at a position where the low `log2(chunk_size)`
/// bits of the rolling hash are all set, provided at least `min_size` bytes
/// have accumulated since the previous boundary. A boundary is forced once
/// `max_size` bytes accumulate regardless of the hash; the forced cut
/// dominates the hash rule, capping the worst case.
///
/// Sizes follow a fixed 1:4:16 policy around the target:
/// `min_size = chunk_size / 4`, `max_size = chunk_size * 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitParams {
    min_size: usize,
    max_size: usize,
    mask: u64,
}

impl SplitParams {
    /// Derive parameters from a target average chunk size.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size < 16` (the derived `min_size` would collapse).
    pub fn from_chunk_size(chunk_size: u32) -> Self {
        assert!(
            chunk_size >= 16,
            "chunk_size must be >= 16 (got {chunk_size})"
        );
        let c = chunk_size as usize;
        Self {
            min_size: c / 4,
            max_size: c * 4,
            mask: (1u64 << chunk_size.ilog2()) - 1,
        }
    }

    /// Minimum chunk size in bytes (not enforced for the final chunk).
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum chunk size in bytes; a cut is forced at this size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether the hash value satisfies the boundary condition.
    #[inline]
    pub fn hash_matches(&self, hash: u64) -> bool {
        hash & self.mask == self.mask
    }
}
