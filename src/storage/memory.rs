//! In-memory bundle store
//!
//! Keeps bundles in insertion order so repeated bounded queries walk the
//! store in a stable order, plus a per-destination index that serves
//! [`IndexHint`] lookups.

use crate::bundle::{BundleId, BundleMeta, Eid};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::store::{BundleFilter, BundleStore, IndexHint};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::SystemTime;

/// A bundle held by the store
#[derive(Debug, Clone)]
struct StoredBundle {
    meta: BundleMeta,
    payload: Bytes,
    stored_at: SystemTime,
    seq: u64,
}

impl StoredBundle {
    fn size(&self) -> u64 {
        self.meta.size.max(self.payload.len() as u64)
    }
}

#[derive(Default)]
struct StoreState {
    bundles: HashMap<BundleId, StoredBundle>,

    /// Insertion sequence -> bundle, the query walk order
    order: BTreeMap<u64, BundleId>,

    /// Destination node -> sequences of singleton bundles
    destination_index: HashMap<Eid, BTreeSet<u64>>,

    /// Sequences of bundles without a singleton destination
    group_index: BTreeSet<u64>,

    next_seq: u64,
    used_bytes: u64,
}

impl StoreState {
    fn index_key(meta: &BundleMeta) -> Eid {
        meta.destination.node()
    }

    /// Sequences worth visiting for a hinted query, in insertion order
    fn hinted_sequences(&self, hint: &IndexHint) -> BTreeSet<u64> {
        let mut seqs: BTreeSet<u64> = self.group_index.clone();
        for (node, entries) in &self.destination_index {
            if hint.matches(node) {
                seqs.extend(entries.iter().copied());
            }
        }
        seqs
    }
}

/// Thread-safe in-memory implementation of [`BundleStore`]
pub struct MemoryBundleStore {
    state: RwLock<StoreState>,
    max_bytes: u64,
}

impl MemoryBundleStore {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            max_bytes,
        }
    }

    /// Store a bundle with its payload
    pub fn insert(&self, meta: BundleMeta, payload: Bytes) -> StorageResult<()> {
        let mut state = self.state.write();

        if state.bundles.contains_key(&meta.id) {
            return Err(StorageError::Duplicate(meta.id));
        }

        let seq = state.next_seq;
        let stored = StoredBundle {
            meta,
            payload,
            stored_at: SystemTime::now(),
            seq,
        };

        let size = stored.size();
        let available = self.max_bytes.saturating_sub(state.used_bytes);
        if size > available {
            return Err(StorageError::CapacityExceeded {
                needed: size,
                available,
            });
        }

        let id = stored.meta.id.clone();
        if stored.meta.is_singleton() {
            state
                .destination_index
                .entry(StoreState::index_key(&stored.meta))
                .or_default()
                .insert(seq);
        } else {
            state.group_index.insert(seq);
        }

        state.next_seq += 1;
        state.used_bytes += size;
        state.order.insert(seq, id.clone());
        state.bundles.insert(id, stored);

        Ok(())
    }

    /// Payload of a stored bundle
    pub fn payload(&self, id: &BundleId) -> StorageResult<Bytes> {
        self.state
            .read()
            .bundles
            .get(id)
            .map(|b| b.payload.clone())
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    /// When the bundle was stored locally
    pub fn stored_at(&self, id: &BundleId) -> StorageResult<SystemTime> {
        self.state
            .read()
            .bundles
            .get(id)
            .map(|b| b.stored_at)
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &BundleId) -> bool {
        self.state.read().bundles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state.read().bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove bundles whose lifetime ended before `now` (DTN time)
    pub fn purge_expired(&self, now: u64) -> Vec<BundleId> {
        let expired: Vec<BundleId> = {
            let state = self.state.read();
            state
                .bundles
                .values()
                .filter(|b| b.meta.expires_at() < now)
                .map(|b| b.meta.id.clone())
                .collect()
        };

        for id in &expired {
            let _ = self.remove(id);
        }

        expired
    }

    pub fn stats(&self) -> StorageStats {
        let state = self.state.read();
        StorageStats {
            total_bundles: state.bundles.len() as u64,
            used_bytes: state.used_bytes,
            max_bytes: self.max_bytes,
            destinations: state
                .destination_index
                .values()
                .filter(|entries| !entries.is_empty())
                .count() as u64,
        }
    }
}

impl BundleStore for MemoryBundleStore {
    fn query(&self, filter: &dyn BundleFilter) -> StorageResult<Vec<BundleMeta>> {
        let limit = filter.limit();
        let state = self.state.read();
        let mut result = Vec::with_capacity(limit.min(state.bundles.len()));

        if limit == 0 {
            return Ok(result);
        }

        let mut visit = |id: &BundleId| -> bool {
            if let Some(stored) = state.bundles.get(id) {
                if filter.should_add(&stored.meta) {
                    result.push(stored.meta.clone());
                }
            }
            result.len() < limit
        };

        match filter.index_hint() {
            Some(hint) => {
                for seq in state.hinted_sequences(&hint) {
                    if let Some(id) = state.order.get(&seq) {
                        if !visit(id) {
                            break;
                        }
                    }
                }
            }
            None => {
                for id in state.order.values() {
                    if !visit(id) {
                        break;
                    }
                }
            }
        }

        Ok(result)
    }

    fn get(&self, id: &BundleId) -> StorageResult<BundleMeta> {
        self.state
            .read()
            .bundles
            .get(id)
            .map(|b| b.meta.clone())
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    fn remove(&self, id: &BundleId) -> StorageResult<BundleMeta> {
        let mut state = self.state.write();

        let stored = state
            .bundles
            .remove(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;

        state.used_bytes = state.used_bytes.saturating_sub(stored.size());
        state.order.remove(&stored.seq);

        if stored.meta.is_singleton() {
            let key = StoreState::index_key(&stored.meta);
            let now_empty = match state.destination_index.get_mut(&key) {
                Some(entries) => {
                    entries.remove(&stored.seq);
                    entries.is_empty()
                }
                None => false,
            };
            if now_empty {
                state.destination_index.remove(&key);
            }
        } else {
            state.group_index.remove(&stored.seq);
        }

        Ok(stored.meta)
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub total_bundles: u64,
    pub used_bytes: u64,
    pub max_bytes: u64,
    pub destinations: u64,
}

impl StorageStats {
    /// Get utilization percentage
    pub fn utilization(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.max_bytes as f64 * 100.0
    }
}

impl std::fmt::Display for StorageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage: {} bundles, {:.2}MB/{:.2}MB ({:.1}%), {} destinations",
            self.total_bundles,
            self.used_bytes as f64 / 1024.0 / 1024.0,
            self.max_bytes as f64 / 1024.0 / 1024.0,
            self.utilization(),
            self.destinations
        )
    }
}
