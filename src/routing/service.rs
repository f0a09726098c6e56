use crate::neighbor::NeighborDirectory;
use crate::queue::TaskQueue;
use crate::report::ReportSink;
use crate::routing::config::ForwardingConfig;
use crate::routing::dispatcher::ForwardingDispatcher;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::events::RoutingEvent;
use crate::routing::translator::EventTranslator;
use crate::storage::BundleStore;
use crate::transport::Transport;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Running neighbor routing: the dispatcher thread plus its event entry point
///
/// Dropping the handle shuts the dispatcher down.
pub struct NeighborRouting {
    config: ForwardingConfig,
    queue: Arc<TaskQueue>,
    directory: Arc<NeighborDirectory>,
    translator: EventTranslator,
    worker: Option<JoinHandle<()>>,
}

impl NeighborRouting {
    /// Validate the configuration and spawn the dispatcher thread
    pub fn start(
        config: ForwardingConfig,
        store: Arc<dyn BundleStore>,
        transport: Arc<dyn Transport>,
        reports: Arc<dyn ReportSink>,
    ) -> RoutingResult<Self> {
        config.validate()?;

        let queue = Arc::new(TaskQueue::new());
        let directory = Arc::new(NeighborDirectory::new(config.max_in_transit_per_neighbor));
        let translator =
            EventTranslator::new(queue.clone(), directory.clone(), store.clone(), reports);

        let dispatcher = ForwardingDispatcher::new(
            config.clone(),
            queue.clone(),
            directory.clone(),
            store,
            transport,
        );

        let worker = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || dispatcher.run())
            .map_err(|e| RoutingError::Worker(e.to_string()))?;

        Ok(Self {
            config,
            queue,
            directory,
            translator,
            worker: Some(worker),
        })
    }

    pub fn notify(&self, event: RoutingEvent) -> RoutingResult<()> {
        self.translator.notify(event)
    }

    /// Cloneable handle for event sources on other threads
    pub fn translator(&self) -> EventTranslator {
        self.translator.clone()
    }

    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }

    pub fn directory(&self) -> &Arc<NeighborDirectory> {
        &self.directory
    }

    pub fn config(&self) -> &ForwardingConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| !worker.is_finished())
            .unwrap_or(false)
    }

    /// Abort the task queue and wait for the dispatcher to exit
    ///
    /// A transfer already handed to the transport is not cancelled.
    pub fn shutdown(&mut self) -> RoutingResult<()> {
        self.queue.abort();

        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| RoutingError::Worker("dispatcher thread panicked".into())),
            None => Ok(()),
        }
    }
}

impl Drop for NeighborRouting {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "neighbor routing shutdown failed");
        }
    }
}
