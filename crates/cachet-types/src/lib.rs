//! Shared types for the cachet content store.
//!
//! This crate defines the two identifiers that cross every component
//! boundary:
//!
//! - [`Digest`] — the address of a single stored node, produced by the
//!   crypto wrapper. Its width depends on the wrapper in use (16 bytes for
//!   AES-SIV-256, 32 for keyed BLAKE3), so it is carried as opaque bytes
//!   rather than a fixed-size array.
//! - [`Handle`] — the caller-visible identifier of a whole content: the
//!   root node's digest followed by the content length.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// Address of a single node in the store.
///
/// A digest is derived deterministically from a node's plaintext by the
/// crypto wrapper: equal plaintexts under the same key always yield equal
/// digests. The digest doubles as the backend key under which the node's
/// ciphertext is stored.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(Bytes);

impl Digest {
    /// Wrap raw digest bytes without copying.
    pub fn from_bytes(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Copy a byte slice into a new digest.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Return the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Digest width in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the digest holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Width of the length suffix in an encoded handle.
pub const HANDLE_LENGTH_SIZE: usize = 8;

/// Caller-visible identifier of a stored content.
///
/// A handle pairs the root node's digest with the total content length.
/// Its wire encoding is `digest || length (u64 big-endian)`, giving a fixed
/// encoded width of `digest_size + 8` for a given crypto wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    digest: Digest,
    length: u64,
}

impl Handle {
    /// Build a handle from a root digest and the content length.
    pub fn new(digest: Digest, length: u64) -> Self {
        Self { digest, length }
    }

    /// The root node's digest.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Total content length in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Encode as `digest || length (u64 big-endian)`.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.digest.len() + HANDLE_LENGTH_SIZE);
        buf.put_slice(self.digest.as_bytes());
        buf.put_u64(self.length);
        buf.freeze()
    }

    /// Decode a handle produced by [`to_bytes`](Self::to_bytes).
    ///
    /// `digest_size` is the digest width of the crypto wrapper the store was
    /// built with; any other encoded length is rejected.
    pub fn from_bytes(bytes: &[u8], digest_size: usize) -> Result<Self, InvalidHandle> {
        let expected = digest_size + HANDLE_LENGTH_SIZE;
        if bytes.len() != expected {
            return Err(InvalidHandle {
                expected,
                found: bytes.len(),
            });
        }
        let (digest, length) = bytes.split_at(digest_size);
        let length = u64::from_be_bytes(length.try_into().expect("length suffix is 8 bytes"));
        Ok(Self {
            digest: Digest::copy_from_slice(digest),
            length,
        })
    }
}

/// An encoded handle whose length does not match `digest_size + 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle: expected {expected} bytes, found {found}")]
pub struct InvalidHandle {
    /// Required encoded length for the configured crypto wrapper.
    pub expected: usize,
    /// Length of the rejected input.
    pub found: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
