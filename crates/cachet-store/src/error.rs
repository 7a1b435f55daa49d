//! Error types for backend and node store operations.

use cachet_crypto::AuthenticityError;
use cachet_types::Digest;

/// Errors surfaced by a key-value backend.
///
/// Backends report plumbing failures only; "key absent" is part of the
/// normal return types, not an error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during node store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The digest is not present in the backend.
    #[error("node not found: {0}")]
    NotFound(Digest),

    /// The stored bytes failed verification against the digest.
    #[error(transparent)]
    Authenticity(#[from] AuthenticityError),

    /// A backend failure, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
