use crate::bundle::{BundleId, BundleMeta, Eid};
use crate::metrics;
use crate::neighbor::{Availability, NeighborDirectory};
use crate::queue::{Task, TaskQueue};
use crate::report::{ReportSink, StatusReport};
use crate::routing::error::RoutingResult;
use crate::routing::events::{AbortReason, RoutingEvent};
use crate::storage::{BundleStore, StorageError};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns system events into routing tasks
///
/// Safe to call from any thread. Apart from small directory updates and the
/// store removals on delivery or refusal, every mapping only pushes onto the
/// task queue.
#[derive(Clone)]
pub struct EventTranslator {
    queue: Arc<TaskQueue>,
    directory: Arc<NeighborDirectory>,
    store: Arc<dyn BundleStore>,
    reports: Arc<dyn ReportSink>,
}

impl EventTranslator {
    pub fn new(
        queue: Arc<TaskQueue>,
        directory: Arc<NeighborDirectory>,
        store: Arc<dyn BundleStore>,
        reports: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            queue,
            directory,
            store,
            reports,
        }
    }

    /// Handle one event
    ///
    /// Only fails once the task queue has been aborted.
    pub fn notify(&self, event: RoutingEvent) -> RoutingResult<()> {
        debug!(event = event.kind(), "routing event");

        match event {
            RoutingEvent::BundleQueued { bundle, origin } => {
                self.queue.push(Task::incoming(bundle, origin))?;
            }
            RoutingEvent::TransferCompleted { peer, bundle } => {
                self.transfer_completed(&peer, &bundle)?;
            }
            RoutingEvent::TransferAborted {
                peer,
                bundle,
                reason,
            } => {
                self.transfer_aborted(&peer, &bundle, reason)?;
            }
            RoutingEvent::NeighborAvailable { neighbor: peer }
            | RoutingEvent::ConnectionUp { peer } => {
                self.directory.set_availability(&peer, Availability::Available);
                self.directory.clear_rejected(&peer);
                self.queue.push(Task::search(peer.node()))?;
            }
            RoutingEvent::NeighborUnavailable { neighbor: peer }
            | RoutingEvent::ConnectionDown { peer } => {
                self.directory
                    .set_availability(&peer, Availability::Unavailable);
            }
        }

        Ok(())
    }

    fn transfer_completed(&self, peer: &Eid, bundle: &BundleMeta) -> RoutingResult<()> {
        self.directory.end_transfer(peer, &bundle.id);
        self.directory
            .mark_known(peer, &bundle.id, bundle.expires_at());
        self.directory.clear_rejected(peer);

        if bundle.is_destined_for(peer) {
            match self.store.remove(&bundle.id) {
                Ok(_) => {
                    self.directory.forget_bundle(&bundle.id);
                    info!(bundle = %bundle.id, peer = %peer, "singleton bundle delivered and removed");
                    metrics::record_delivery();
                    self.reports.emit(StatusReport::delivered(bundle.id.clone()));
                }
                // a duplicate completion, or the bundle already left by another path
                Err(StorageError::NotFound(_)) => {
                    debug!(bundle = %bundle.id, "delivered bundle already removed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.queue.push(Task::search(peer.node()))?;
        Ok(())
    }

    fn transfer_aborted(
        &self,
        peer: &Eid,
        bundle: &BundleId,
        reason: AbortReason,
    ) -> RoutingResult<()> {
        self.directory.end_transfer(peer, bundle);

        match reason {
            AbortReason::ConnectionDown => {
                debug!(bundle = %bundle, peer = %peer, "transfer aborted, connection down");
                return Ok(());
            }
            AbortReason::Refused => self.remove_refused(peer, bundle)?,
            AbortReason::Undefined
            | AbortReason::RetryLimitReached
            | AbortReason::BundleDeleted => {
                debug!(bundle = %bundle, peer = %peer, %reason, "transfer aborted");
            }
        }

        self.queue.push(Task::search(peer.node()))?;
        Ok(())
    }

    /// The destination refused a singleton bundle; it can never be delivered
    fn remove_refused(&self, peer: &Eid, bundle: &BundleId) -> RoutingResult<()> {
        let meta = match self.store.get(bundle) {
            Ok(meta) => meta,
            Err(StorageError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if !meta.is_destined_for(peer) {
            return Ok(());
        }

        match self.store.remove(bundle) {
            Ok(_) => {
                self.directory.forget_bundle(bundle);
                info!(bundle = %bundle, peer = %peer, "refused bundle removed");
                metrics::record_refused_removal();
                Ok(())
            }
            Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
