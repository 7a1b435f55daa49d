//! Error type for crypto wrapper operations.

/// A ciphertext failed verification against its digest.
///
/// Raised whenever unwrapping cannot prove that the bytes were produced by
/// `wrap_value` under the same key and digest: a mismatched or truncated
/// SIV, a failed authentication tag, a digest of the wrong width. The
/// store treats any node failing verification as invalidating the whole
/// tree that references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("node failed authenticity verification")]
pub struct AuthenticityError;
