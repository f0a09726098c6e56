//! Recording collaborators shared by the scenario tests

#![allow(dead_code)]

use bytes::Bytes;
use dtn_relay::bundle::{BundleId, BundleMeta, Eid};
use dtn_relay::neighbor::NeighborDirectory;
use dtn_relay::queue::{Task, TaskQueue};
use dtn_relay::report::{ReportSink, StatusReport};
use dtn_relay::routing::{EventTranslator, ForwardingConfig, ForwardingDispatcher};
use dtn_relay::storage::MemoryBundleStore;
use dtn_relay::transport::{Transport, TransportError, TransportResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn eid(s: &str) -> Eid {
    s.parse().unwrap()
}

pub fn singleton(seq: u64, destination: &str) -> BundleMeta {
    BundleMeta::new(BundleId::new(eid("dtn://src/app"), 1_000, seq), eid(destination))
}

pub fn group(seq: u64, destination: &str) -> BundleMeta {
    singleton(seq, destination).with_singleton(false)
}

/// Transport that records submissions and rejects selected bundles
#[derive(Default)]
pub struct RecordingTransport {
    submitted: Mutex<Vec<(Eid, BundleId)>>,
    rejected: Mutex<HashSet<BundleId>>,
}

impl RecordingTransport {
    pub fn reject(&self, id: &BundleId) {
        self.rejected.lock().insert(id.clone());
    }

    pub fn submitted(&self) -> Vec<(Eid, BundleId)> {
        self.submitted.lock().clone()
    }

    pub fn submitted_to(&self, peer: &Eid) -> Vec<BundleId> {
        self.submitted
            .lock()
            .iter()
            .filter(|(p, _)| p == peer)
            .map(|(_, id)| id.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn submit(&self, peer: &Eid, bundle: &BundleId) -> TransportResult<()> {
        if self.rejected.lock().contains(bundle) {
            return Err(TransportError::Rejected {
                peer: peer.clone(),
                reason: "queue full".into(),
            });
        }
        self.submitted.lock().push((peer.clone(), bundle.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<StatusReport>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().clone()
    }
}

impl ReportSink for RecordingSink {
    fn emit(&self, report: StatusReport) {
        self.reports.lock().push(report);
    }
}

/// Routing core driven step by step from the test thread
pub struct Node {
    pub queue: Arc<TaskQueue>,
    pub directory: Arc<NeighborDirectory>,
    pub store: Arc<MemoryBundleStore>,
    pub transport: Arc<RecordingTransport>,
    pub reports: Arc<RecordingSink>,
    pub dispatcher: ForwardingDispatcher,
    pub translator: EventTranslator,
}

impl Node {
    pub fn new(config: ForwardingConfig) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let directory = Arc::new(NeighborDirectory::new(config.max_in_transit_per_neighbor));
        let store = Arc::new(MemoryBundleStore::new(16 * 1024 * 1024));
        let transport = Arc::new(RecordingTransport::default());
        let reports = Arc::new(RecordingSink::default());

        let dispatcher = ForwardingDispatcher::new(
            config,
            queue.clone(),
            directory.clone(),
            store.clone(),
            transport.clone(),
        );
        let translator = EventTranslator::new(
            queue.clone(),
            directory.clone(),
            store.clone(),
            reports.clone(),
        );

        Self {
            queue,
            directory,
            store,
            transport,
            reports,
            dispatcher,
            translator,
        }
    }

    pub fn store_bundle(&self, meta: &BundleMeta) {
        self.store
            .insert(meta.clone(), Bytes::from_static(b"payload"))
            .unwrap();
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.queue.drain()
    }
}

pub fn default_node() -> Node {
    Node::new(ForwardingConfig::new(eid("dtn://local")))
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
