//! Neighbor directory
//!
//! Per-neighbor bookkeeping shared by the dispatcher and the event
//! translator: which bundles a neighbor already has, which ones are on
//! their way to it, and whether it is currently reachable.

pub mod directory;
pub mod error;
pub mod types;

pub use directory::NeighborDirectory;
pub use error::{ReservationError, ReservationResult};
pub use types::{Availability, NeighborEntry, NeighborSnapshot};
