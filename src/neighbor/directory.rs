use crate::bundle::{BundleId, Eid};
use crate::neighbor::error::{ReservationError, ReservationResult};
use crate::neighbor::types::{Availability, NeighborEntry, NeighborSnapshot};
use dashmap::DashMap;

/// Table of per-neighbor state, keyed by node identifier
///
/// Every mutation of an entry happens under that entry's shard lock and only
/// for the duration of the in-memory update. Callers never get a reference
/// that outlives the call, so no lock is ever held across a store query or a
/// transport submission.
pub struct NeighborDirectory {
    entries: DashMap<Eid, NeighborEntry>,
    max_in_transit: usize,
}

impl NeighborDirectory {
    pub fn new(max_in_transit: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_in_transit,
        }
    }

    pub fn max_in_transit(&self) -> usize {
        self.max_in_transit
    }

    /// Run `f` on the entry for `eid`, creating it if needed
    pub fn with_entry<R>(&self, eid: &Eid, f: impl FnOnce(&mut NeighborEntry) -> R) -> R {
        let mut entry = self
            .entries
            .entry(eid.node())
            .or_insert_with(|| NeighborEntry::new(eid.clone()));
        f(entry.value_mut())
    }

    /// Snapshot of the entry for `eid`, creating it if needed
    pub fn get_or_create(&self, eid: &Eid) -> NeighborSnapshot {
        self.with_entry(eid, |entry| entry.snapshot())
    }

    /// Snapshot of an existing entry
    pub fn get(&self, eid: &Eid) -> Option<NeighborSnapshot> {
        self.entries.get(&eid.node()).map(|entry| entry.snapshot())
    }

    pub fn contains(&self, eid: &Eid) -> bool {
        self.entries.contains_key(&eid.node())
    }

    /// True if the bundle is already confirmed at the neighbor
    pub fn has_known(&self, eid: &Eid, id: &BundleId) -> bool {
        self.entries
            .get(&eid.node())
            .map(|entry| entry.has(id))
            .unwrap_or(false)
    }

    /// True if the bundle is currently reserved for the neighbor
    pub fn is_in_transit(&self, eid: &Eid, id: &BundleId) -> bool {
        self.entries
            .get(&eid.node())
            .map(|entry| entry.is_in_transit(id))
            .unwrap_or(false)
    }

    /// Atomically reserve a bundle for transfer to the neighbor
    ///
    /// Fails if the neighbor is unavailable, if the bundle is already in
    /// transit to it, or if the neighbor's in-transit capacity is used up.
    pub fn try_begin_transfer(&self, eid: &Eid, id: &BundleId) -> ReservationResult<()> {
        let max_in_transit = self.max_in_transit;
        self.with_entry(eid, |entry| {
            if !entry.is_available() {
                return Err(ReservationError::NeighborNotAvailable(entry.eid.clone()));
            }
            if entry.is_in_transit(id) {
                return Err(ReservationError::AlreadyInTransit {
                    neighbor: entry.eid.clone(),
                    bundle: id.clone(),
                });
            }
            if entry.transit_count() >= max_in_transit {
                return Err(ReservationError::NoMoreTransfers {
                    neighbor: entry.eid.clone(),
                    limit: max_in_transit,
                });
            }
            entry.insert_in_transit(id.clone());
            Ok(())
        })
    }

    /// Release a reservation; returns whether one was held
    pub fn end_transfer(&self, eid: &Eid, id: &BundleId) -> bool {
        self.entries
            .get_mut(&eid.node())
            .map(|mut entry| entry.remove_in_transit(id))
            .unwrap_or(false)
    }

    /// Record that the neighbor now holds the bundle until `expires_at` (DTN time)
    pub fn mark_known(&self, eid: &Eid, id: &BundleId, expires_at: u64) {
        self.with_entry(eid, |entry| {
            entry.add_known(id.clone(), expires_at);
        });
    }

    /// Merge a summary of bundles the neighbor reported holding
    ///
    /// Entries stay valid until `expires_at` (DTN time). Returns how many
    /// bundles were new.
    pub fn update_summary(
        &self,
        eid: &Eid,
        ids: impl IntoIterator<Item = BundleId>,
        expires_at: u64,
    ) -> usize {
        self.with_entry(eid, |entry| {
            ids.into_iter()
                .map(|id| entry.add_known(id, expires_at))
                .filter(|added| *added)
                .count()
        })
    }

    /// Exclude a bundle from searches for this neighbor until the next link
    /// up or completed transfer
    pub fn mark_rejected(&self, eid: &Eid, id: &BundleId) {
        self.with_entry(eid, |entry| entry.add_rejected(id.clone()));
    }

    pub fn clear_rejected(&self, eid: &Eid) {
        if let Some(mut entry) = self.entries.get_mut(&eid.node()) {
            entry.clear_rejected();
        }
    }

    /// Remove a bundle that left the store from every neighbor
    ///
    /// Returns the number of entries that referenced it.
    pub fn forget_bundle(&self, id: &BundleId) -> usize {
        self.entries
            .iter_mut()
            .map(|mut entry| entry.forget(id))
            .filter(|forgot| *forgot)
            .count()
    }

    /// Drop known bundles whose lifetime ended before `now` (DTN time)
    pub fn expire_known(&self, now: u64) -> usize {
        self.entries
            .iter_mut()
            .map(|mut entry| entry.expire_known(now))
            .sum()
    }

    pub fn set_availability(&self, eid: &Eid, availability: Availability) {
        self.with_entry(eid, |entry| entry.set_availability(availability));
    }

    /// Node identifiers of every neighbor currently reachable
    pub fn available_neighbors(&self) -> Vec<Eid> {
        self.entries
            .iter()
            .filter(|entry| entry.is_available())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Drop a neighbor that is gone for good
    pub fn remove(&self, eid: &Eid) -> Option<NeighborEntry> {
        self.entries.remove(&eid.node()).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
