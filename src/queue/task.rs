use crate::bundle::{BundleMeta, Eid};
use std::fmt;

/// Deferred routing work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Find and send up to the candidate bound of bundles to this neighbor
    SearchNextBundle { neighbor: Eid },

    /// A bundle became available; re-evaluate every known neighbor
    ProcessIncomingBundle { bundle: BundleMeta, origin: Eid },
}

impl Task {
    pub fn search(neighbor: Eid) -> Self {
        Task::SearchNextBundle { neighbor }
    }

    pub fn incoming(bundle: BundleMeta, origin: Eid) -> Self {
        Task::ProcessIncomingBundle { bundle, origin }
    }

    /// Short label used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Task::SearchNextBundle { .. } => "search_next_bundle",
            Task::ProcessIncomingBundle { .. } => "process_incoming_bundle",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::SearchNextBundle { neighbor } => write!(f, "SearchNextBundle: {neighbor}"),
            Task::ProcessIncomingBundle { bundle, .. } => {
                write!(f, "ProcessIncomingBundle: {}", bundle.id)
            }
        }
    }
}
