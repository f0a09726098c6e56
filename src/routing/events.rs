use crate::bundle::{BundleId, BundleMeta, Eid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the transport gave up on a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    Undefined,
    RetryLimitReached,
    BundleDeleted,
    ConnectionDown,
    Refused,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            AbortReason::Undefined => "undefined",
            AbortReason::RetryLimitReached => "retry limit reached",
            AbortReason::BundleDeleted => "bundle deleted",
            AbortReason::ConnectionDown => "connection down",
            AbortReason::Refused => "refused",
        };
        f.write_str(reason)
    }
}

/// System events the forwarding core reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingEvent {
    /// A bundle was received or created and placed in storage
    BundleQueued { bundle: BundleMeta, origin: Eid },

    TransferCompleted { peer: Eid, bundle: BundleMeta },

    TransferAborted {
        peer: Eid,
        bundle: BundleId,
        reason: AbortReason,
    },

    NeighborAvailable { neighbor: Eid },

    NeighborUnavailable { neighbor: Eid },

    ConnectionUp { peer: Eid },

    ConnectionDown { peer: Eid },
}

impl RoutingEvent {
    /// Short label used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingEvent::BundleQueued { .. } => "bundle_queued",
            RoutingEvent::TransferCompleted { .. } => "transfer_completed",
            RoutingEvent::TransferAborted { .. } => "transfer_aborted",
            RoutingEvent::NeighborAvailable { .. } => "neighbor_available",
            RoutingEvent::NeighborUnavailable { .. } => "neighbor_unavailable",
            RoutingEvent::ConnectionUp { .. } => "connection_up",
            RoutingEvent::ConnectionDown { .. } => "connection_down",
        }
    }
}
