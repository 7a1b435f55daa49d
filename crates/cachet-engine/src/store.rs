//! [`ContentStore`] — the content store facade.
//!
//! Ties the pipeline together: CDC splitting → leaf insertion → interior
//! levels built by re-chunking serialized child records → root handle.
//! Reads walk the tree top-down, pruning subtrees outside the requested
//! range; deletes walk the same tree and release every node once.

use std::ops::Range;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use cachet_chunking::{ContentSplitter, RecordSplitter};
use cachet_crypto::CryptoWrapper;
use cachet_store::{KvBackend, NodeStore, StoreError};
use cachet_types::{Digest, Handle};
use tracing::debug;

use crate::encoding::{ChildRef, InternalNodeBuf, Node, decode_node, encode_leaf, encode_record};
use crate::error::ContentError;

/// Configuration for creating a [`ContentStore`].
///
/// Frozen at construction: the chunk size participates in every digest the
/// store ever produces, so changing it on an existing backend would orphan
/// all previously stored contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStoreConfig {
    /// Target average chunk size in bytes, at every level of the tree.
    pub chunk_size: u32,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self { chunk_size: 4096 }
    }
}

/// Secure, deduplicating content store over an untrusted key-value backend.
///
/// Contents are decomposed into a chunk tree: leaves are content-defined
/// chunks of the input, interior nodes are content-defined groups of child
/// references. Every node is wrapped (addressed and encrypted) before it
/// reaches the backend, and reference-counted so that the N-th
/// [`delete_content`](Self::delete_content) undoes exactly the N-th
/// [`put_content`](Self::put_content) of the same bytes.
///
/// The store is stateless apart from its configuration; all persistent
/// state lives in the backend. It is `Send + Sync` and can be shared
/// across tasks behind an `Arc`.
pub struct ContentStore {
    nodes: NodeStore,
    splitter: ContentSplitter,
    digest_size: usize,
}

impl ContentStore {
    /// Create a content store over the given backend and crypto wrapper.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is smaller than twice the wrapper's digest
    /// size: interior nodes would then have an expected fan-out below two,
    /// and the storage-efficiency guarantees collapse.
    pub fn new(
        config: ContentStoreConfig,
        backend: Arc<dyn KvBackend>,
        crypto: Arc<dyn CryptoWrapper>,
    ) -> Self {
        let digest_size = crypto.digest_size();
        assert!(
            config.chunk_size as usize >= 2 * digest_size,
            "chunk_size must be at least twice the digest size ({} < {})",
            config.chunk_size,
            2 * digest_size
        );
        Self {
            nodes: NodeStore::new(backend, crypto),
            splitter: ContentSplitter::from_chunk_size(config.chunk_size),
            digest_size,
        }
    }

    /// Width in bytes of digests (and thus of handles minus the length
    /// suffix) produced by this store.
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Access the underlying node store.
    pub fn node_store(&self) -> &NodeStore {
        &self.nodes
    }

    /// Decode an encoded handle, validating its length for this store's
    /// crypto wrapper.
    pub fn parse_handle(&self, bytes: &[u8]) -> Result<Handle, ContentError> {
        Ok(Handle::from_bytes(bytes, self.digest_size)?)
    }

    /// Insert a content and return its handle.
    ///
    /// Deterministic: the same bytes always produce the same handle, and a
    /// repeated insertion stores no new ciphertext — it only bumps the
    /// reference counts of the existing tree.
    pub async fn put_content(&self, data: &[u8]) -> Result<Handle, ContentError> {
        Ok(self.put_content_checked(data).await?.0)
    }

    /// Like [`put_content`](Self::put_content), but also report whether
    /// the content was new: `false` means an identical content was already
    /// present and only reference counts changed.
    pub async fn put_content_checked(&self, data: &[u8]) -> Result<(Handle, bool), ContentError> {
        // Leaf level. A zero-length content is a single canonical empty
        // leaf so that it still has a root node to address.
        let mut level: Vec<ChildRef> = Vec::new();
        let mut last_new = true;

        if data.is_empty() {
            let (digest, new) = self.nodes.insert(&encode_leaf(b"")).await?;
            level.push(ChildRef { digest, length: 0 });
            last_new = new;
        } else {
            for chunk in self.splitter.split(data) {
                let (digest, new) = self.nodes.insert(&encode_leaf(chunk.data)).await?;
                level.push(ChildRef {
                    digest,
                    length: chunk.data.len() as u64,
                });
                last_new = new;
            }
        }

        // Interior levels, until a single root remains.
        let mut height = 0u32;
        while level.len() > 1 {
            height += 1;
            debug!(entries = level.len(), height, "building interior level");
            let (next, new) = self.build_level(level).await?;
            level = next;
            last_new = new;
        }

        let root = level.pop().expect("tree build always yields a root");
        debug!(digest = %root.digest, length = data.len(), height, new = last_new, "stored content");
        Ok((Handle::new(root.digest, data.len() as u64), last_new))
    }

    /// Group one level of child references into interior nodes.
    ///
    /// The serialized records are re-chunked with the same boundary rule as
    /// the leaf level, aligned to record ends, so that a shifted child list
    /// still maps mostly onto the interior nodes of earlier insertions.
    async fn build_level(
        &self,
        children: Vec<ChildRef>,
    ) -> Result<(Vec<ChildRef>, bool), ContentError> {
        let mut splitter = RecordSplitter::new(self.splitter.params());
        let mut pending = InternalNodeBuf::new();
        let mut next = Vec::new();
        let mut last_new = true;

        for child in children {
            let record = encode_record(&child);
            let boundary = splitter.push_record(&record);
            pending.push(&record, child.length);

            if boundary {
                let (plaintext, length) = pending.take();
                let (digest, new) = self.nodes.insert(&plaintext).await?;
                next.push(ChildRef { digest, length });
                last_new = new;
            }
        }

        if !pending.is_empty() {
            let (plaintext, length) = pending.take();
            let (digest, new) = self.nodes.insert(&plaintext).await?;
            next.push(ChildRef { digest, length });
            last_new = new;
        }

        Ok((next, last_new))
    }

    /// Retrieve the full content stored under `handle`.
    ///
    /// Fails with a `NotFound` store error if any reachable node is absent,
    /// and with an authenticity error if any reachable node has been
    /// mutated by the backend.
    pub async fn get_content(&self, handle: &Handle) -> Result<Bytes, ContentError> {
        self.read_range(handle, 0, handle.length()).await
    }

    /// Retrieve the byte range `[range.start, range.end)` of the content.
    ///
    /// The range is clamped to the content length. Only nodes overlapping
    /// the range are fetched, so a short range of a large content touches
    /// O(log n) nodes.
    pub async fn get_range(
        &self,
        handle: &Handle,
        range: Range<u64>,
    ) -> Result<Bytes, ContentError> {
        let start = range.start.min(handle.length());
        let end = range.end.min(handle.length()).max(start);
        self.read_range(handle, start, end).await
    }

    async fn read_range(
        &self,
        handle: &Handle,
        start: u64,
        end: u64,
    ) -> Result<Bytes, ContentError> {
        let mut out = BytesMut::with_capacity((end - start) as usize);

        // Depth-first, leftmost child on top of the stack, so leaves are
        // appended in content order. The root is always fetched (even for
        // an empty range) so that tampering never goes unnoticed.
        let mut stack: Vec<(Digest, u64)> = vec![(handle.digest().clone(), 0)];
        while let Some((digest, offset)) = stack.pop() {
            let plaintext = self.nodes.fetch(&digest).await?;
            match decode_node(&plaintext, self.digest_size).map_err(StoreError::from)? {
                Node::Leaf(data) => {
                    let lo = start.saturating_sub(offset).min(data.len() as u64) as usize;
                    let hi = end.saturating_sub(offset).min(data.len() as u64) as usize;
                    if lo < hi {
                        out.extend_from_slice(&data[lo..hi]);
                    }
                }
                Node::Internal(children) => {
                    let mut pushed = Vec::new();
                    let mut child_offset = offset;
                    for child in children {
                        let child_end = child_offset + child.length;
                        if child_offset < end && child_end > start {
                            pushed.push((child.digest, child_offset));
                        }
                        child_offset = child_end;
                    }
                    stack.extend(pushed.into_iter().rev());
                }
            }
        }

        Ok(out.freeze())
    }

    /// Delete one insertion of the content stored under `handle`.
    ///
    /// Walks the tree and drops one reference from every node encountered —
    /// the exact mirror image of the insertions performed by the `put`
    /// being undone. Nodes whose count reaches zero are physically removed.
    ///
    /// Not idempotent: deleting a handle more times than it was put fails
    /// with a `NotFound` store error, and releases already performed before
    /// the failure are not rolled back.
    pub async fn delete_content(&self, handle: &Handle) -> Result<(), ContentError> {
        let mut released = 0u64;
        let mut stack = vec![handle.digest().clone()];

        while let Some(digest) = stack.pop() {
            let plaintext = self.nodes.fetch(&digest).await?;
            let node = decode_node(&plaintext, self.digest_size).map_err(StoreError::from)?;
            self.nodes.release(&digest).await?;
            released += 1;
            if let Node::Internal(children) = node {
                stack.extend(children.into_iter().map(|child| child.digest));
            }
        }

        debug!(digest = %handle.digest(), nodes = released, "deleted content");
        Ok(())
    }
}
