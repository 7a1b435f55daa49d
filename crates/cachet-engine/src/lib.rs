//! Chunk tree and content store facade.
//!
//! The [`ContentStore`] binds the CDC splitter, the crypto wrapper and the
//! reference-counted node store into the three caller-facing operations:
//! `put_content`, `get_content` and `delete_content`. Contents are stored
//! as Merkle-style chunk trees whose node boundaries are content-defined at
//! every level, so contents sharing substrings share physical nodes — both
//! leaves and whole interior subtrees.

mod encoding;
mod error;
mod store;

pub use cachet_types::{Digest, Handle, InvalidHandle};
pub use error::ContentError;
pub use store::{ContentStore, ContentStoreConfig};

#[cfg(test)]
mod tests;
