//! Forwarding dispatcher
//!
//! The single consumer of the task queue. Runs on its own thread and is the
//! only component that queries the store on behalf of a neighbor or submits
//! bundles to the transport.

use crate::bundle::{BundleMeta, Eid};
use crate::metrics::{self, TaskTimer};
use crate::neighbor::{Availability, NeighborDirectory, ReservationError};
use crate::queue::{Task, TaskQueue};
use crate::routing::config::ForwardingConfig;
use crate::routing::error::RoutingResult;
use crate::routing::filter::NeighborBundleFilter;
use crate::storage::BundleStore;
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a search ended before trying every candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStop {
    Reservation(ReservationError),
    Transport(TransportError),
}

/// What one search for a neighbor did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub candidates: usize,
    pub submitted: usize,
    pub skipped_in_transit: usize,
    pub rejected: usize,
    pub stopped_early: Option<SearchStop>,
}

/// Result of executing one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Searched(SearchSummary),
    FannedOut { neighbors: usize },
}

pub struct ForwardingDispatcher {
    config: ForwardingConfig,
    queue: Arc<TaskQueue>,
    directory: Arc<NeighborDirectory>,
    store: Arc<dyn BundleStore>,
    transport: Arc<dyn Transport>,
}

impl ForwardingDispatcher {
    pub fn new(
        config: ForwardingConfig,
        queue: Arc<TaskQueue>,
        directory: Arc<NeighborDirectory>,
        store: Arc<dyn BundleStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            queue,
            directory,
            store,
            transport,
        }
    }

    /// Process tasks until the queue is aborted
    ///
    /// A failing task is logged and dropped; it never ends the loop.
    pub fn run(&self) {
        info!(local_node = %self.config.local_node, "neighbor routing started");

        loop {
            match self.run_once() {
                Ok(_) => {}
                Err(e) if e.is_shutdown() => break,
                Err(e) => warn!(error = %e, "routing task failed"),
            }
        }

        info!("neighbor routing stopped");
    }

    /// Block for the next task and execute it
    pub fn run_once(&self) -> RoutingResult<TaskOutcome> {
        let task = self.queue.pop_blocking()?;
        let kind = task.kind();
        debug!(%task, "processing task");

        let timer = TaskTimer::start();
        let result = self.execute(task);
        timer.stop();
        metrics::record_task(kind);

        if let Err(e) = &result {
            if !e.is_shutdown() {
                metrics::record_task_failed(kind);
            }
        }
        result
    }

    pub fn execute(&self, task: Task) -> RoutingResult<TaskOutcome> {
        match task {
            Task::SearchNextBundle { neighbor } => {
                self.search_next_bundle(&neighbor).map(TaskOutcome::Searched)
            }
            Task::ProcessIncomingBundle { bundle, origin } => self.process_incoming(&bundle, &origin),
        }
    }

    fn search_next_bundle(&self, neighbor: &Eid) -> RoutingResult<SearchSummary> {
        let mut summary = SearchSummary::default();

        loop {
            let snapshot = self.directory.get_or_create(neighbor);
            if snapshot.availability != Availability::Available {
                let stop = ReservationError::NeighborNotAvailable(snapshot.eid.clone());
                metrics::record_search_stopped(stop.reason());
                summary.stopped_early = Some(SearchStop::Reservation(stop));
                return Ok(summary);
            }

            let neighbor = snapshot.eid.clone();
            let filter = NeighborBundleFilter::new(
                snapshot,
                &self.config.local_node,
                self.config.max_candidates,
            )
            .with_index_hint(self.config.use_index_hint);

            let candidates = self.store.query(&filter)?;
            summary.candidates += candidates.len();
            metrics::record_candidates(candidates.len());
            debug!("got {} items to transfer to {}", candidates.len(), neighbor);

            let rejected_before = summary.rejected;
            for meta in &candidates {
                if let Some(stop) = self.try_forward(&neighbor, meta, &mut summary) {
                    summary.stopped_early = Some(stop);
                    return Ok(summary);
                }
            }

            // a full batch with turned-down bundles may hide further candidates;
            // they are excluded now, so query again
            let batch_full = candidates.len() >= self.config.max_candidates;
            if !batch_full || summary.rejected == rejected_before {
                return Ok(summary);
            }
        }
    }

    /// Reserve and submit one candidate; `Some` ends the search
    fn try_forward(
        &self,
        neighbor: &Eid,
        meta: &BundleMeta,
        summary: &mut SearchSummary,
    ) -> Option<SearchStop> {
        if let Err(e) = self.directory.try_begin_transfer(neighbor, &meta.id) {
            if !e.ends_search() {
                summary.skipped_in_transit += 1;
                metrics::record_in_transit_skip();
                return None;
            }
            debug!(neighbor = %neighbor, reason = e.reason(), "search stopped");
            metrics::record_search_stopped(e.reason());
            return Some(SearchStop::Reservation(e));
        }

        match self.transport.submit(neighbor, &meta.id) {
            Ok(()) => {
                summary.submitted += 1;
                metrics::record_bundle_submitted();
                debug!(bundle = %meta.id, neighbor = %neighbor, "bundle submitted");
                None
            }
            Err(e @ TransportError::Rejected { .. }) => {
                self.directory.end_transfer(neighbor, &meta.id);
                self.directory.mark_rejected(neighbor, &meta.id);
                summary.rejected += 1;
                metrics::record_transport_rejected();
                debug!(bundle = %meta.id, error = %e, "submission rejected");
                None
            }
            Err(e) => {
                self.directory.end_transfer(neighbor, &meta.id);
                debug!(neighbor = %neighbor, error = %e, "search stopped");
                metrics::record_search_stopped("transport_unavailable");
                Some(SearchStop::Transport(e))
            }
        }
    }

    /// Re-evaluate a new bundle against every reachable neighbor
    fn process_incoming(&self, bundle: &BundleMeta, origin: &Eid) -> RoutingResult<TaskOutcome> {
        // the peer that handed us the bundle already holds it
        if !origin.same_node(&self.config.local_node) && self.directory.contains(origin) {
            self.directory
                .mark_known(origin, &bundle.id, bundle.expires_at());
        }

        let neighbors = self.directory.available_neighbors();
        for neighbor in &neighbors {
            self.queue.push(Task::search(neighbor.clone()))?;
        }

        debug!(bundle = %bundle.id, neighbors = neighbors.len(), "incoming bundle fanned out");
        Ok(TaskOutcome::FannedOut {
            neighbors: neighbors.len(),
        })
    }
}
