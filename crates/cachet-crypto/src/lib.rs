//! Crypto wrappers for the cachet content store.
//!
//! A [`CryptoWrapper`] binds together the two cryptographic roles of a
//! stored node: its *address* (a deterministic digest of the plaintext) and
//! its *protection at rest* (the ciphertext actually handed to the
//! backend). Keeping both behind one interface is what makes the store
//! convergent — equal plaintexts under the same key land at equal backend
//! keys — while still detecting any tampering by the backend on read.
//!
//! Two wrappers are provided:
//!
//! - [`Aes256SivWrapper`] — the default. Deterministic AES-SIV-256: the
//!   16-byte synthetic IV doubles as the digest, and the stored bytes are
//!   `SIV || AES-CTR ciphertext`. Confidential and authenticated.
//! - [`KeyedBlake3Wrapper`] — integrity-only: a 32-byte keyed BLAKE3 hash
//!   as digest, plaintext stored in the clear. For backends that are
//!   private but not trusted to be honest.
//!
//! Wrappers are deliberately free of store-level concerns: no reference
//! counts, no node tags, no lengths. They see opaque plaintext bytes.

mod error;
mod keyed;
mod siv;
mod wrapper;

pub use error::AuthenticityError;
pub use keyed::KeyedBlake3Wrapper;
pub use siv::{Aes256SivWrapper, SIV_DIGEST_SIZE};
pub use wrapper::{CryptoWrapper, MASTER_KEY_SIZE};
