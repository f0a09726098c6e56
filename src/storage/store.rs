use crate::bundle::{BundleId, BundleMeta, Eid};
use crate::storage::error::StorageResult;
use std::fmt;

/// Optimization hint for stores backed by an indexed query engine
///
/// A hint may only narrow the rows the store visits; the filter's
/// [`BundleFilter::should_add`] stays authoritative. Bundles without a
/// singleton destination are never covered by a hint and must always be
/// visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexHint {
    /// Singleton destinations living on the given node
    DestinationNode(Eid),
}

impl IndexHint {
    /// Whether a singleton destination falls inside the hint
    pub fn matches(&self, destination: &Eid) -> bool {
        match self {
            IndexHint::DestinationNode(node) => destination.same_node(node),
        }
    }
}

/// Renders the hint as an SQL predicate over a `destination` column
impl fmt::Display for IndexHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexHint::DestinationNode(node) => {
                let node = node.node();
                match node.scheme() {
                    "dtn" => write!(
                        f,
                        "(destination = '{node}' OR destination LIKE '{node}/%')"
                    ),
                    "ipn" => {
                        let base = node
                            .as_str()
                            .rsplit_once('.')
                            .map(|(base, _)| base)
                            .unwrap_or(node.as_str());
                        write!(f, "destination LIKE '{base}.%'")
                    }
                    _ => write!(f, "destination = '{node}'"),
                }
            }
        }
    }
}

/// Selection predicate evaluated by the store during a bounded query
pub trait BundleFilter {
    /// Maximum number of bundles to return
    fn limit(&self) -> usize;

    /// Whether the bundle belongs in the result set
    fn should_add(&self, meta: &BundleMeta) -> bool;

    fn index_hint(&self) -> Option<IndexHint> {
        None
    }
}

/// Bundle store consumed by the forwarding core
///
/// Implementations must be callable from the dispatcher thread and from any
/// event source concurrently.
pub trait BundleStore: Send + Sync {
    /// Return at most `filter.limit()` bundles accepted by the filter
    fn query(&self, filter: &dyn BundleFilter) -> StorageResult<Vec<BundleMeta>>;

    /// Fails with `StorageError::NotFound` if absent
    fn get(&self, id: &BundleId) -> StorageResult<BundleMeta>;

    /// Fails with `StorageError::NotFound` if absent
    fn remove(&self, id: &BundleId) -> StorageResult<BundleMeta>;
}
