use crate::bundle::BundleId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Bundle not found: {0}")]
    NotFound(BundleId),

    #[error("Bundle already stored: {0}")]
    Duplicate(BundleId),

    #[error("Storage capacity exceeded (needed {needed} bytes, {available} available)")]
    CapacityExceeded { needed: u64, available: u64 },
}

impl StorageError {
    /// Not-found is tolerated by every caller in the routing core
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
