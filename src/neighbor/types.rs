use crate::bundle::{BundleId, Eid};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
}

/// State kept for one neighbor node
#[derive(Debug, Clone)]
pub struct NeighborEntry {
    /// Neighbor's node identifier
    pub eid: Eid,

    /// Bundles confirmed present at the neighbor, with their expiry in DTN time
    known: HashMap<BundleId, u64>,

    /// Bundles currently handed to the transport for this neighbor
    in_transit: HashSet<BundleId>,

    /// Bundles the transport turned down for this neighbor since the last
    /// link up or completed transfer
    rejected: HashSet<BundleId>,

    availability: Availability,
}

impl NeighborEntry {
    /// New entries start out available
    pub fn new(eid: Eid) -> Self {
        Self {
            eid: eid.node(),
            known: HashMap::new(),
            in_transit: HashSet::new(),
            rejected: HashSet::new(),
            availability: Availability::Available,
        }
    }

    /// Whether the bundle is already confirmed at this neighbor
    pub fn has(&self, id: &BundleId) -> bool {
        self.known.contains_key(id)
    }

    pub fn is_in_transit(&self, id: &BundleId) -> bool {
        self.in_transit.contains(id)
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn transit_count(&self) -> usize {
        self.in_transit.len()
    }

    pub(crate) fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    /// Returns true if the bundle was not known before
    pub(crate) fn add_known(&mut self, id: BundleId, expires_at: u64) -> bool {
        self.known.insert(id, expires_at).is_none()
    }

    pub(crate) fn insert_in_transit(&mut self, id: BundleId) -> bool {
        self.in_transit.insert(id)
    }

    pub(crate) fn remove_in_transit(&mut self, id: &BundleId) -> bool {
        self.in_transit.remove(id)
    }

    pub(crate) fn add_rejected(&mut self, id: BundleId) {
        self.rejected.insert(id);
    }

    pub(crate) fn clear_rejected(&mut self) {
        self.rejected.clear();
    }

    /// Drop every trace of a bundle that left the store
    pub(crate) fn forget(&mut self, id: &BundleId) -> bool {
        let known = self.known.remove(id).is_some();
        let rejected = self.rejected.remove(id);
        known || rejected
    }

    /// Drop known bundles whose lifetime ended before `now`
    pub(crate) fn expire_known(&mut self, now: u64) -> usize {
        let before = self.known.len();
        self.known.retain(|_, expires_at| *expires_at >= now);
        before - self.known.len()
    }

    /// Copy of the state a candidate filter needs, detached from any lock
    pub fn snapshot(&self) -> NeighborSnapshot {
        NeighborSnapshot {
            eid: self.eid.clone(),
            known: self.known.keys().cloned().collect(),
            in_transit: self.in_transit.clone(),
            rejected: self.rejected.clone(),
            availability: self.availability,
        }
    }
}

/// Point-in-time copy of a [`NeighborEntry`]
#[derive(Debug, Clone)]
pub struct NeighborSnapshot {
    pub eid: Eid,
    pub known: HashSet<BundleId>,
    pub in_transit: HashSet<BundleId>,
    pub rejected: HashSet<BundleId>,
    pub availability: Availability,
}

impl NeighborSnapshot {
    pub fn has(&self, id: &BundleId) -> bool {
        self.known.contains(id)
    }

    pub fn is_in_transit(&self, id: &BundleId) -> bool {
        self.in_transit.contains(id)
    }

    pub fn is_rejected(&self, id: &BundleId) -> bool {
        self.rejected.contains(id)
    }
}
