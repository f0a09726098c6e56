use crate::bundle::{BundleId, Eid};
use thiserror::Error;

/// Why a transfer reservation was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("Bundle {bundle} already in transit to {neighbor}")]
    AlreadyInTransit { neighbor: Eid, bundle: BundleId },

    #[error("No more transfers available for {neighbor} (limit: {limit})")]
    NoMoreTransfers { neighbor: Eid, limit: usize },

    #[error("Neighbor not available: {0}")]
    NeighborNotAvailable(Eid),
}

impl ReservationError {
    /// Whether the current search for this neighbor should stop
    pub fn ends_search(&self) -> bool {
        !matches!(self, ReservationError::AlreadyInTransit { .. })
    }

    /// Short label used for logging and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ReservationError::AlreadyInTransit { .. } => "already_in_transit",
            ReservationError::NoMoreTransfers { .. } => "no_more_transfers",
            ReservationError::NeighborNotAvailable(_) => "neighbor_not_available",
        }
    }
}

pub type ReservationResult<T> = Result<T, ReservationError>;
