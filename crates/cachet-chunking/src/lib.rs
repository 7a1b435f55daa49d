//! Content-Defined Chunking (CDC) for the cachet content store.
//!
//! This crate provides:
//! - [`ContentSplitter`] — splits a byte stream into variable-size chunks
//!   whose boundaries are determined by a rolling hash over the content.
//! - [`RecordSplitter`] — applies the same boundary rule to a stream of
//!   serialized child records, emitting boundaries only at record ends.
//!   This is what makes deduplication work at the interior levels of the
//!   chunk tree, not just at the leaves.
//!
//! Boundaries depend only on a 48-byte window of surrounding bytes, so
//! inserting or deleting a few bytes shifts only the chunks near the edit;
//! the rest of the stream re-synchronizes and keeps its old boundaries.
//!
//! **Parameters are frozen at store construction and must never change**,
//! otherwise existing contents would re-chunk differently and deduplication
//! (and digest determinism) would break.

mod params;
mod record;
mod rolling;
mod splitter;

pub use params::SplitParams;
pub use record::RecordSplitter;
pub use rolling::{RollingHash, WINDOW_SIZE};
pub use splitter::{Chunk, Chunks, ContentSplitter};
