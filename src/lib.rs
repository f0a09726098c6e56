//! Opportunistic bundle forwarding for a delay-tolerant networking daemon
//!
//! Whenever a neighbor becomes reachable, a bundle arrives, or a transfer
//! finishes, the routing core picks stored bundles the neighbor does not yet
//! have and hands them to the transport layer.

pub mod bundle;
pub mod metrics;
pub mod neighbor;
pub mod queue;
pub mod report;
pub mod routing;
pub mod storage;
pub mod transport;

pub use bundle::{BundleId, BundleMeta, Eid};
pub use routing::{EventTranslator, ForwardingConfig, NeighborRouting, RoutingEvent};
