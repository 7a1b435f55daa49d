//! Deterministic AES-SIV-256 wrapper.
//!
//! Wrapped node format (binary):
//! ```text
//! [16 bytes: synthetic IV][N bytes: AES-CTR ciphertext]
//! ```
//!
//! The synthetic IV is computed over the plaintext with the (expanded)
//! master key, so it is simultaneously a MAC, the CTR nonce, and a
//! convergent address: the digest IS the SIV. Tampering with either half
//! of the stored bytes makes SIV re-verification fail on decrypt.

use aes_siv::aead::KeyInit;
use aes_siv::siv::Aes256Siv;
use bytes::Bytes;
use cachet_types::Digest;
use subtle::ConstantTimeEq;

use crate::error::AuthenticityError;
use crate::wrapper::{CryptoWrapper, MASTER_KEY_SIZE};

/// Width of the synthetic IV, and therefore of this wrapper's digests.
pub const SIV_DIGEST_SIZE: usize = 16;

/// HKDF domain separating the node cipher key from other uses of the
/// master key. Changing this string changes every digest ever produced.
const KEY_DOMAIN: &[u8] = b"cachet node aes-siv-256 v1";

/// Convergent AES-SIV-256 crypto wrapper.
///
/// AES-256-SIV needs a 64-byte key (two AES-256 subkeys); the 32-byte
/// master key is expanded with HKDF-SHA256 under a fixed domain string at
/// construction time. The master key is read-only after construction.
pub struct Aes256SivWrapper {
    key: [u8; 64],
}

impl Aes256SivWrapper {
    /// Create a wrapper from a 32-byte master key.
    pub fn new(master_key: &[u8; MASTER_KEY_SIZE]) -> Self {
        let mut key = [0u8; 64];
        let hkdf = hkdf::Hkdf::<sha2::Sha256>::new(None, master_key);
        hkdf.expand(KEY_DOMAIN, &mut key)
            .expect("64 bytes is a valid HKDF-SHA256 output length");
        Self { key }
    }

    fn cipher(&self) -> Aes256Siv {
        Aes256Siv::new((&self.key).into())
    }
}

impl CryptoWrapper for Aes256SivWrapper {
    fn digest_size(&self) -> usize {
        SIV_DIGEST_SIZE
    }

    fn wrap_value(&self, plaintext: &[u8]) -> (Digest, Bytes) {
        let sealed = self
            .cipher()
            .encrypt(std::iter::empty::<&[u8]>(), plaintext)
            .expect("SIV encryption of an in-memory buffer cannot fail");
        let sealed = Bytes::from(sealed);
        let digest = Digest::from_bytes(sealed.slice(..SIV_DIGEST_SIZE));
        (digest, sealed)
    }

    fn unwrap_value(
        &self,
        digest: &Digest,
        ciphertext: &[u8],
    ) -> Result<Bytes, AuthenticityError> {
        if digest.len() != SIV_DIGEST_SIZE || ciphertext.len() < SIV_DIGEST_SIZE {
            return Err(AuthenticityError);
        }
        // The stored SIV must match the address the caller fetched by.
        if !bool::from(
            digest
                .as_bytes()
                .ct_eq(&ciphertext[..SIV_DIGEST_SIZE]),
        ) {
            return Err(AuthenticityError);
        }
        // Decryption re-derives the SIV from the recovered plaintext and
        // compares in constant time; any bit flip surfaces here.
        let plaintext = self
            .cipher()
            .decrypt(std::iter::empty::<&[u8]>(), ciphertext)
            .map_err(|_| AuthenticityError)?;
        Ok(Bytes::from(plaintext))
    }
}
