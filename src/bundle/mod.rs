//! Bundle data model
//!
//! Endpoint identifiers and the bundle metadata the forwarding core routes on.
//! Payloads never pass through routing; they stay in the bundle store.

pub mod error;
pub mod types;

pub use error::{EidError, EidResult};
pub use types::{dtn_time_now, BundleId, BundleMeta, Eid, ProcFlags};
