//! Bundle storage contract
//!
//! The durable bundle store lives outside the forwarding core. This module
//! defines what the core needs from it (bounded filtered queries, lookup and
//! removal by identity) and ships an in-memory store used by the demo daemon
//! and the test suite.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryBundleStore, StorageStats};
pub use store::{BundleFilter, BundleStore, IndexHint};
