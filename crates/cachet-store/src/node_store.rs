//! Reference-counted encrypted node store.
//!
//! Stored entry format (binary):
//! ```text
//! [8 bytes: refcount, big-endian][N bytes: ciphertext]
//! ```
//!
//! The refcount equals the number of live insertions of the node: it is
//! incremented by every [`insert`](NodeStore::insert) of the same plaintext
//! and decremented by every [`release`](NodeStore::release); the entry is
//! physically removed exactly when the count drops from 1 to 0. The N-th
//! release therefore undoes exactly the N-th insert.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use cachet_crypto::{AuthenticityError, CryptoWrapper};
use cachet_types::Digest;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::KvBackend;
use crate::error::StoreError;

/// Width of the refcount prefix in a stored entry.
const REFCOUNT_SIZE: usize = 8;

/// Number of lock stripes serializing per-digest updates.
const LOCK_STRIPES: usize = 64;

/// Reference-counted node store over an untrusted key-value backend.
///
/// Layers the crypto wrapper (addressing + encryption) and a per-entry
/// reference counter over raw backend operations. Updates to a given
/// digest are serialized through a striped lock table, so concurrent
/// `insert`/`release` on the same digest always observe the
/// `Absent → Live(n) → Absent` lifecycle as if run in some total order.
pub struct NodeStore {
    backend: Arc<dyn KvBackend>,
    crypto: Arc<dyn CryptoWrapper>,
    locks: Vec<Mutex<()>>,
}

impl NodeStore {
    /// Create a node store over the given backend and crypto wrapper.
    pub fn new(backend: Arc<dyn KvBackend>, crypto: Arc<dyn CryptoWrapper>) -> Self {
        Self {
            backend,
            crypto,
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// The crypto wrapper this store addresses nodes with.
    pub fn crypto(&self) -> &Arc<dyn CryptoWrapper> {
        &self.crypto
    }

    fn stripe(&self, digest: &Digest) -> &Mutex<()> {
        let index = digest
            .as_bytes()
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        &self.locks[(index % LOCK_STRIPES as u64) as usize]
    }

    /// Insert a node plaintext, returning its digest and whether the node
    /// is new to the backend.
    ///
    /// If the digest already exists, only the refcount prefix is rewritten;
    /// the stored ciphertext bytes are left untouched.
    pub async fn insert(&self, plaintext: &[u8]) -> Result<(Digest, bool), StoreError> {
        let (digest, ciphertext) = self.crypto.wrap_value(plaintext);

        let _guard = self.stripe(&digest).lock().await;
        match self.backend.get(digest.as_bytes()).await? {
            Some(value) => {
                let (refcount, existing) = decode_entry(value)?;
                let refcount = refcount + 1;
                self.backend
                    .put(digest.as_bytes(), encode_entry(refcount, &existing))
                    .await?;
                debug!(%digest, refcount, "incremented node refcount");
                Ok((digest, false))
            }
            None => {
                self.backend
                    .put(digest.as_bytes(), encode_entry(1, &ciphertext))
                    .await?;
                debug!(%digest, size = ciphertext.len(), "inserted new node");
                Ok((digest, true))
            }
        }
    }

    /// Fetch and verify the plaintext stored under `digest`.
    pub async fn fetch(&self, digest: &Digest) -> Result<Bytes, StoreError> {
        let value = self
            .backend
            .get(digest.as_bytes())
            .await?
            .ok_or_else(|| StoreError::NotFound(digest.clone()))?;
        let (_, ciphertext) = decode_entry(value)?;
        Ok(self.crypto.unwrap_value(digest, &ciphertext)?)
    }

    /// Drop one reference to `digest`, removing the entry when the count
    /// reaches zero.
    pub async fn release(&self, digest: &Digest) -> Result<(), StoreError> {
        let _guard = self.stripe(digest).lock().await;
        let value = self
            .backend
            .get(digest.as_bytes())
            .await?
            .ok_or_else(|| StoreError::NotFound(digest.clone()))?;
        let (refcount, ciphertext) = decode_entry(value)?;

        if refcount > 1 {
            let refcount = refcount - 1;
            self.backend
                .put(digest.as_bytes(), encode_entry(refcount, &ciphertext))
                .await?;
            debug!(%digest, refcount, "decremented node refcount");
        } else {
            self.backend.delete(digest.as_bytes()).await?;
            debug!(%digest, "removed node");
        }
        Ok(())
    }

    /// Current refcount of `digest`, or `None` if absent.
    pub async fn refcount(&self, digest: &Digest) -> Result<Option<u64>, StoreError> {
        match self.backend.get(digest.as_bytes()).await? {
            Some(value) => Ok(Some(decode_entry(value)?.0)),
            None => Ok(None),
        }
    }
}

fn encode_entry(refcount: u64, ciphertext: &Bytes) -> Bytes {
    let mut buf = BytesMut::with_capacity(REFCOUNT_SIZE + ciphertext.len());
    buf.put_u64(refcount);
    buf.extend_from_slice(ciphertext);
    buf.freeze()
}

/// Split a stored value into refcount and ciphertext.
///
/// An entry too short to carry its refcount prefix cannot have been
/// written by this store, so it is reported as an authenticity failure.
fn decode_entry(value: Bytes) -> Result<(u64, Bytes), StoreError> {
    if value.len() < REFCOUNT_SIZE {
        return Err(StoreError::Authenticity(AuthenticityError));
    }
    let refcount = u64::from_be_bytes(
        value[..REFCOUNT_SIZE]
            .try_into()
            .expect("refcount prefix is 8 bytes"),
    );
    Ok((refcount, value.slice(REFCOUNT_SIZE..)))
}
