//! Candidate selection for one neighbor

use crate::bundle::{BundleMeta, Eid};
use crate::neighbor::NeighborSnapshot;
use crate::storage::{BundleFilter, IndexHint};

/// Selects bundles worth sending to one neighbor
///
/// Rules, in order, first rejection wins:
/// 1. the hop limit is used up
/// 2. singleton bundles addressed to the local node, or to any node other
///    than this neighbor
/// 3. bundles the neighbor already holds, that are already on their way to
///    it, or that the transport turned down for it since the last link up
pub struct NeighborBundleFilter {
    neighbor: NeighborSnapshot,
    local_node: Eid,
    limit: usize,
    use_index_hint: bool,
}

impl NeighborBundleFilter {
    pub fn new(neighbor: NeighborSnapshot, local_node: &Eid, limit: usize) -> Self {
        Self {
            neighbor,
            local_node: local_node.node(),
            limit,
            use_index_hint: false,
        }
    }

    pub fn with_index_hint(mut self, enabled: bool) -> Self {
        self.use_index_hint = enabled;
        self
    }

    pub fn neighbor(&self) -> &Eid {
        &self.neighbor.eid
    }
}

impl BundleFilter for NeighborBundleFilter {
    fn limit(&self) -> usize {
        self.limit
    }

    fn should_add(&self, meta: &BundleMeta) -> bool {
        if meta.hop_limit_reached() {
            return false;
        }

        if meta.is_singleton() {
            let destination = meta.destination.node();

            // never forward bundles addressed to ourselves
            if destination == self.local_node {
                return false;
            }

            if destination != self.neighbor.eid.node() {
                return false;
            }
        }

        if self.neighbor.has(&meta.id)
            || self.neighbor.is_in_transit(&meta.id)
            || self.neighbor.is_rejected(&meta.id)
        {
            return false;
        }

        true
    }

    fn index_hint(&self) -> Option<IndexHint> {
        self.use_index_hint
            .then(|| IndexHint::DestinationNode(self.neighbor.eid.node()))
    }
}
