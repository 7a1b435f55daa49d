//! Core trait for key-value backends.

use bytes::Bytes;

use crate::error::BackendError;

/// Minimal contract for the untrusted key-value service cachet stores
/// ciphertext in.
///
/// Keys are digest bytes (width fixed by the crypto wrapper in use);
/// values are opaque byte strings. A single `put` or `delete` is assumed
/// atomic. No iteration or listing is required of a backend — the store
/// never enumerates keys.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Values travel as [`Bytes`] to keep hand-offs through the pipeline
/// copy-free.
#[async_trait::async_trait]
pub trait KvBackend: Send + Sync {
    /// Fetch the value stored under `key`. Returns `None` if absent.
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), BackendError>;

    /// Remove `key`. Returns `false` when the key was absent.
    async fn delete(&self, key: &[u8]) -> Result<bool, BackendError>;
}
