use pinhole_core::StoreError;
use thiserror::Error;

/// Result type for domain mapping operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// A dual-write was left half-applied: one table was updated, the
    /// write or compensation against the other failed.
    #[error("bidirectional index left inconsistent for short domain '{short_domain}': {source}")]
    Inconsistent {
        short_domain: String,
        source: StoreError,
    },
}
