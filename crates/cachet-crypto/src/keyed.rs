//! Integrity-only keyed-hash wrapper.

use bytes::Bytes;
use cachet_types::Digest;
use subtle::ConstantTimeEq;

use crate::error::AuthenticityError;
use crate::wrapper::{CryptoWrapper, MASTER_KEY_SIZE};

/// Keyed BLAKE3 wrapper: authenticated, but *not* encrypted.
///
/// The digest is the 32-byte keyed BLAKE3 hash of the plaintext; the
/// stored bytes are the plaintext itself. Because the hash is keyed, a
/// backend that cannot guess the key can neither forge a node nor mount an
/// offline dictionary attack on addresses — but it can read every stored
/// byte. Use [`Aes256SivWrapper`](crate::Aes256SivWrapper) whenever
/// confidentiality matters.
pub struct KeyedBlake3Wrapper {
    key: [u8; MASTER_KEY_SIZE],
}

impl KeyedBlake3Wrapper {
    /// Create a wrapper from a 32-byte master key.
    pub fn new(master_key: &[u8; MASTER_KEY_SIZE]) -> Self {
        Self { key: *master_key }
    }
}

impl CryptoWrapper for KeyedBlake3Wrapper {
    fn digest_size(&self) -> usize {
        blake3::OUT_LEN
    }

    fn wrap_value(&self, plaintext: &[u8]) -> (Digest, Bytes) {
        let hash = blake3::keyed_hash(&self.key, plaintext);
        (
            Digest::copy_from_slice(hash.as_bytes()),
            Bytes::copy_from_slice(plaintext),
        )
    }

    fn unwrap_value(
        &self,
        digest: &Digest,
        ciphertext: &[u8],
    ) -> Result<Bytes, AuthenticityError> {
        let computed = blake3::keyed_hash(&self.key, ciphertext);
        if !bool::from(computed.as_bytes().ct_eq(digest.as_bytes())) {
            return Err(AuthenticityError);
        }
        Ok(Bytes::copy_from_slice(ciphertext))
    }
}
