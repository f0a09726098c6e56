//! Demo relay daemon
//!
//! Wires the forwarding core to an in-memory bundle store and a loopback
//! transport that completes, retries or refuses transfers at random.
//!
//! Usage: `dtn-relay [config.json]`. Set `DTN_RELAY_METRICS=0.0.0.0:9090`
//! to expose Prometheus metrics.

use anyhow::Context;
use bytes::Bytes;
use dtn_relay::bundle::{dtn_time_now, BundleId, BundleMeta, Eid};
use dtn_relay::metrics::{self, MetricsConfig};
use dtn_relay::report;
use dtn_relay::routing::{AbortReason, ForwardingConfig, NeighborRouting, RoutingEvent};
use dtn_relay::storage::{BundleStore, MemoryBundleStore};
use dtn_relay::transport::{Transport, TransportError, TransportResult};
use rand::Rng;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const STORE_CAPACITY: u64 = 64 * 1024 * 1024;
const DEMO_NEIGHBORS: [&str; 3] = ["dtn://alpha", "dtn://beta", "dtn://gamma"];
const DEMO_BUNDLES: u64 = 40;
const PURGE_INTERVAL: Duration = Duration::from_secs(30);

/// Transport that hands submissions to a simulated link task
struct LoopbackTransport {
    submissions: mpsc::UnboundedSender<(Eid, BundleId)>,
}

impl Transport for LoopbackTransport {
    fn submit(&self, peer: &Eid, bundle: &BundleId) -> TransportResult<()> {
        self.submissions
            .send((peer.clone(), bundle.clone()))
            .map_err(|_| TransportError::Closed)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ForwardingConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => ForwardingConfig::default(),
    };

    metrics::init_metrics();
    if let Ok(addr) = std::env::var("DTN_RELAY_METRICS") {
        let addr: SocketAddr = addr.parse().context("invalid DTN_RELAY_METRICS address")?;
        metrics::start_metrics_server(MetricsConfig::with_addr(addr))?;
    }

    let store = Arc::new(MemoryBundleStore::new(STORE_CAPACITY));
    let (report_tx, mut report_rx) = report::channel();
    let (submit_tx, submit_rx) = mpsc::unbounded_channel();

    let local_node = config.local_node.clone();
    let mut routing = NeighborRouting::start(
        config,
        store.clone(),
        Arc::new(LoopbackTransport {
            submissions: submit_tx,
        }),
        Arc::new(report_tx),
    )?;

    tokio::spawn(simulate_link(submit_rx, routing.translator(), store.clone()));

    tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            info!(%report, "status report");
        }
    });

    {
        let store = store.clone();
        let directory = routing.directory().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let now = dtn_time_now();
                let purged = store.purge_expired(now);
                if !purged.is_empty() {
                    info!(count = purged.len(), "purged expired bundles");
                }
                let forgotten = directory.expire_known(now);
                if forgotten > 0 {
                    debug!(count = forgotten, "expired known bundles dropped");
                }
                debug!(stats = %store.stats(), "store");
            }
        });
    }

    for neighbor in DEMO_NEIGHBORS {
        routing.notify(RoutingEvent::ConnectionUp {
            peer: Eid::new(neighbor)?,
        })?;
    }

    // ipn endpoints take a numeric service
    let application = if local_node.scheme() == "ipn" { "1" } else { "demo" };
    let source = local_node.endpoint(application)?;
    for seq in 0..DEMO_BUNDLES {
        let (destination, singleton, size) = {
            let mut rng = rand::thread_rng();
            let pick = rng.gen_range(0..=DEMO_NEIGHBORS.len());
            let size = rng.gen_range(64..4096usize);
            match DEMO_NEIGHBORS.get(pick) {
                Some(node) => (format!("{node}/inbox"), true, size),
                None => ("dtn://everyone/news".to_string(), false, size),
            }
        };

        let meta = BundleMeta::new(BundleId::now(source.clone(), seq), Eid::new(destination)?)
            .with_singleton(singleton)
            .with_size(size as u64);
        store.insert(meta.clone(), Bytes::from(vec![0u8; size]))?;
        routing.notify(RoutingEvent::BundleQueued {
            bundle: meta,
            origin: local_node.clone(),
        })?;
    }

    info!(stats = %store.stats(), "demo bundles queued, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    tokio::task::spawn_blocking(move || routing.shutdown()).await??;
    info!(stats = %store.stats(), "relay stopped");
    Ok(())
}

/// Resolve each submission after a short random delay
async fn simulate_link(
    mut submissions: mpsc::UnboundedReceiver<(Eid, BundleId)>,
    translator: dtn_relay::EventTranslator,
    store: Arc<MemoryBundleStore>,
) {
    while let Some((peer, bundle)) = submissions.recv().await {
        let translator = translator.clone();
        let store = store.clone();

        tokio::spawn(async move {
            let (delay, roll) = {
                let mut rng = rand::thread_rng();
                (rng.gen_range(5..50u64), rng.gen_range(0..100u32))
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let event = match (roll, store.get(&bundle)) {
                (0..=84, Ok(meta)) => RoutingEvent::TransferCompleted { peer, bundle: meta },
                (0..=84, Err(_)) => RoutingEvent::TransferAborted {
                    peer,
                    bundle,
                    reason: AbortReason::BundleDeleted,
                },
                (85..=94, _) => RoutingEvent::TransferAborted {
                    peer,
                    bundle,
                    reason: AbortReason::RetryLimitReached,
                },
                _ => RoutingEvent::TransferAborted {
                    peer,
                    bundle,
                    reason: AbortReason::Refused,
                },
            };

            if let Err(e) = translator.notify(event) {
                warn!(error = %e, "routing event dropped");
            }
        });
    }
}
