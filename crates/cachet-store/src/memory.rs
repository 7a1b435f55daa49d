//! In-memory key-value backend.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tracing::debug;

use crate::backend::KvBackend;
use crate::error::BackendError;

/// In-memory backend backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for ephemeral stores. The diagnostic accessors
/// ([`len`](Self::len), [`total_bytes`](Self::total_bytes),
/// [`keys`](Self::keys)) expose the raw physical state; dedup and refcount
/// tests are built on them.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<Bytes, Bytes>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total physical size: the sum of all key and value lengths.
    pub fn total_bytes(&self) -> u64 {
        let map = self.entries.read().expect("lock poisoned");
        map.iter().map(|(k, v)| (k.len() + v.len()) as u64).sum()
    }

    /// Snapshot of all stored keys, in no particular order.
    pub fn keys(&self) -> Vec<Bytes> {
        let map = self.entries.read().expect("lock poisoned");
        map.keys().cloned().collect()
    }
}

#[async_trait::async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, BackendError> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), BackendError> {
        let mut map = self.entries.write().expect("lock poisoned");
        debug!(size = value.len(), "storing entry in memory");
        map.insert(Bytes::copy_from_slice(key), value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, BackendError> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }
}
