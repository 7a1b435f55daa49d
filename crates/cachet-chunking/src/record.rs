//! Record-aligned splitter for interior tree levels.

use crate::params::SplitParams;
use crate::rolling::RollingHash;

/// Content-defined grouping of serialized child records.
///
/// Interior nodes of the chunk tree are built by re-chunking the serialized
/// list of child references. The rolling hash slides over the raw record
/// bytes exactly as at the leaf level and the boundary predicate is
/// evaluated at every byte — but a group may only end where a record ends:
/// a match anywhere inside a record emits the boundary after that record's
/// last byte. Min/max sizes are counted in stream bytes, and a group is
/// forced closed once it reaches `max_size` even if the hash never matched.
///
/// The hash state carries across group boundaries, which is what lets a
/// record insertion re-synchronize with the groups of a previous version
/// after O(1) records.
pub struct RecordSplitter {
    params: SplitParams,
    hash: RollingHash,
    group_bytes: usize,
    matched: bool,
}

impl RecordSplitter {
    /// Create a splitter with the given boundary parameters.
    pub fn new(params: SplitParams) -> Self {
        Self {
            params,
            hash: RollingHash::new(),
            group_bytes: 0,
            matched: false,
        }
    }

    /// Feed one serialized record.
    ///
    /// Returns `true` when the current group ends after this record; the
    /// caller then starts a new group with the next record. Any records fed
    /// after the last `true` form a final, possibly undersized group that
    /// the caller flushes explicitly.
    pub fn push_record(&mut self, record: &[u8]) -> bool {
        for &byte in record {
            let hash = self.hash.push(byte);
            self.group_bytes += 1;
            if self.group_bytes >= self.params.min_size() && self.params.hash_matches(hash) {
                self.matched = true;
            }
        }

        if self.matched || self.group_bytes >= self.params.max_size() {
            self.matched = false;
            self.group_bytes = 0;
            true
        } else {
            false
        }
    }
}
