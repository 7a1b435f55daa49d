//! Node plaintext encoding.
//!
//! Every node is serialized before wrapping as:
//! ```text
//! [1 byte: tag][payload]
//! ```
//! Leaf payload is the raw chunk bytes. Interior payload is a sequence of
//! child records, each `digest || subtree_length`, where the length is an
//! unsigned LEB128 varint. The digest width is fixed by the crypto wrapper,
//! so records need no framing of their own.
//!
//! Every choice here (tag values, record order, varint flavor) is part of
//! the persistent format: changing any of them changes every digest.

use bytes::{Bytes, BytesMut};
use cachet_crypto::AuthenticityError;
use cachet_types::Digest;

/// Tag byte marking a leaf node.
pub(crate) const TAG_LEAF: u8 = 0x00;

/// Tag byte marking an interior node.
pub(crate) const TAG_INTERNAL: u8 = 0x01;

/// Maximum bytes of a u64 LEB128 varint: ceil(64 / 7).
const MAX_VARINT_BYTES: usize = 10;

/// Reference to a child node: its digest plus the length of the content
/// its subtree represents. Subtree lengths are what make ranged reads
/// possible without touching off-range subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildRef {
    pub digest: Digest,
    pub length: u64,
}

/// A decoded node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Leaf(Bytes),
    Internal(Vec<ChildRef>),
}

/// Serialize a leaf node plaintext.
pub(crate) fn encode_leaf(chunk: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + chunk.len());
    buf.push(TAG_LEAF);
    buf.extend_from_slice(chunk);
    buf
}

/// Serialize one child record: `digest || varint(subtree_length)`.
pub(crate) fn encode_record(child: &ChildRef) -> Vec<u8> {
    let mut buf = Vec::with_capacity(child.digest.len() + MAX_VARINT_BYTES);
    buf.extend_from_slice(child.digest.as_bytes());
    encode_varint(child.length, &mut buf);
    buf
}

/// Decode a node plaintext.
///
/// The plaintext has already been authenticated by the crypto wrapper, so
/// a malformed encoding means the bytes were never written by this store;
/// it is reported as an authenticity failure rather than a panic.
pub(crate) fn decode_node(
    plaintext: &Bytes,
    digest_size: usize,
) -> Result<Node, AuthenticityError> {
    let (&tag, payload) = plaintext.split_first().ok_or(AuthenticityError)?;
    match tag {
        TAG_LEAF => Ok(Node::Leaf(plaintext.slice(1..))),
        TAG_INTERNAL => {
            let mut children = Vec::new();
            let mut rest = payload;
            while !rest.is_empty() {
                if rest.len() < digest_size {
                    return Err(AuthenticityError);
                }
                let (digest, tail) = rest.split_at(digest_size);
                let (length, consumed) = decode_varint(tail).ok_or(AuthenticityError)?;
                children.push(ChildRef {
                    digest: Digest::copy_from_slice(digest),
                    length,
                });
                rest = &tail[consumed..];
            }
            Ok(Node::Internal(children))
        }
        _ => Err(AuthenticityError),
    }
}

/// Append an unsigned LEB128 varint to `buf`.
pub(crate) fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode an unsigned LEB128 varint. Returns `(value, bytes_consumed)`,
/// or `None` on truncated or over-long input.
pub(crate) fn decode_varint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return None;
        }
        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }
    None
}

/// Accumulates one interior node's payload while a level is being grouped.
pub(crate) struct InternalNodeBuf {
    buf: BytesMut,
    length: u64,
}

impl InternalNodeBuf {
    pub(crate) fn new() -> Self {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[TAG_INTERNAL]);
        Self { buf, length: 0 }
    }

    /// Append one child record to the pending node.
    pub(crate) fn push(&mut self, record: &[u8], child_length: u64) {
        self.buf.extend_from_slice(record);
        self.length += child_length;
    }

    /// True when no records have been appended since the last take.
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.len() == 1
    }

    /// Take the completed plaintext and the summed subtree length,
    /// resetting the buffer for the next group.
    pub(crate) fn take(&mut self) -> (Bytes, u64) {
        let plaintext = std::mem::replace(self, Self::new());
        (plaintext.buf.freeze(), plaintext.length)
    }
}
