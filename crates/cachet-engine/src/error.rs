//! Error type for content store operations.

use cachet_store::StoreError;
use cachet_types::InvalidHandle;

/// Errors that can occur during content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A node store failure: missing node, failed verification, or a
    /// backend error. Propagated unchanged from the layer that raised it.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An encoded handle of the wrong length.
    #[error(transparent)]
    InvalidHandle(#[from] InvalidHandle),
}
