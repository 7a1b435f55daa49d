//! The crypto wrapper trait.

use bytes::Bytes;
use cachet_types::Digest;

use crate::error::AuthenticityError;

/// Width of a wrapper's master key in bytes.
pub const MASTER_KEY_SIZE: usize = 32;

/// Address-and-protect interface for stored node plaintexts.
///
/// Implementations must be deterministic: for a fixed key and plaintext,
/// `wrap_value` always produces the same digest and ciphertext. This is
/// what makes deduplication work across contents and across insertions.
///
/// `unwrap_value` must reject — with cryptographically negligible error
/// probability — any ciphertext that was not produced by `wrap_value`
/// under the same key with the given digest.
///
/// All implementations must be `Send + Sync`; wrappers are shared across
/// async tasks behind an `Arc`.
pub trait CryptoWrapper: Send + Sync {
    /// Width in bytes of the digests this wrapper produces.
    fn digest_size(&self) -> usize;

    /// Deterministically derive a node's digest and its stored ciphertext.
    fn wrap_value(&self, plaintext: &[u8]) -> (Digest, Bytes);

    /// Recover and verify a plaintext from its digest and stored bytes.
    fn unwrap_value(&self, digest: &Digest, ciphertext: &[u8])
    -> Result<Bytes, AuthenticityError>;
}
