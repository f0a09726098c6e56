//! Convergence-layer contract
//!
//! Submission only hands a bundle over. Completion and abort outcomes come
//! back later as routing events, never as return values.

pub mod error;

pub use error::{TransportError, TransportResult};

use crate::bundle::{BundleId, Eid};

/// Transport layer consumed by the dispatcher
pub trait Transport: Send + Sync {
    /// Queue `bundle` for transfer to `peer`
    ///
    /// `Ok(())` means the transport accepted the bundle and will later report
    /// a transfer completed or aborted event for it.
    fn submit(&self, peer: &Eid, bundle: &BundleId) -> TransportResult<()>;
}
