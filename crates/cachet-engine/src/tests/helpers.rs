//! Shared test utilities for cachet-engine tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use cachet_crypto::{Aes256SivWrapper, KeyedBlake3Wrapper};
use cachet_store::{BackendError, KvBackend, MemoryBackend};

use crate::{ContentStore, ContentStoreConfig};

/// Fixed master key shared by all tests.
pub const TEST_KEY: [u8; 32] = [0x42u8; 32];

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Content store over a fresh in-memory backend with the AES-SIV wrapper.
pub fn siv_store(chunk_size: u32) -> (ContentStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let crypto = Arc::new(Aes256SivWrapper::new(&TEST_KEY));
    let store = ContentStore::new(ContentStoreConfig { chunk_size }, backend.clone(), crypto);
    (store, backend)
}

/// Content store over a fresh in-memory backend with the keyed-BLAKE3
/// (integrity-only) wrapper.
pub fn blake3_store(chunk_size: u32) -> (ContentStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let crypto = Arc::new(KeyedBlake3Wrapper::new(&TEST_KEY));
    let store = ContentStore::new(ContentStoreConfig { chunk_size }, backend.clone(), crypto);
    (store, backend)
}

/// Byte-exact snapshot of a memory backend's physical state.
pub async fn snapshot(backend: &MemoryBackend) -> BTreeMap<Bytes, Bytes> {
    let mut map = BTreeMap::new();
    for key in backend.keys() {
        let value = backend.get(&key).await.unwrap().unwrap();
        map.insert(key, value);
    }
    map
}

/// Memory backend that counts `get` calls, for node-touch accounting.
#[derive(Default)]
pub struct CountingBackend {
    inner: MemoryBackend,
    gets: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls since the last reset.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::Relaxed)
    }

    pub fn reset_gets(&self) {
        self.gets.store(0, Ordering::Relaxed);
    }
}

#[async_trait::async_trait]
impl KvBackend for CountingBackend {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, BackendError> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.inner.get(key).await
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), BackendError> {
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, BackendError> {
        self.inner.delete(key).await
    }
}
