//! End-to-end routing scenarios: events in, store mutations, reports and
//! transport submissions out.

#[path = "support/mod.rs"]
mod support;

use dtn_relay::bundle::dtn_time_now;
use dtn_relay::neighbor::ReservationError;
use dtn_relay::queue::Task;
use dtn_relay::report::BundleStatus;
use dtn_relay::routing::{
    AbortReason, ForwardingConfig, NeighborRouting, RoutingEvent, SearchStop, SearchSummary,
    TaskOutcome,
};
use dtn_relay::storage::BundleStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use support::*;

fn searched(outcome: TaskOutcome) -> SearchSummary {
    match outcome {
        TaskOutcome::Searched(summary) => summary,
        other => panic!("expected a search, got {other:?}"),
    }
}

#[test]
fn test_delivery_removes_bundle_once() {
    println!("\n=== Delivery Scenario ===\n");
    let node = default_node();
    let bundle = singleton(1, "dtn://b/app");
    node.store_bundle(&bundle);

    let completed = RoutingEvent::TransferCompleted {
        peer: eid("dtn://b/app"),
        bundle: bundle.clone(),
    };

    node.translator.notify(completed.clone()).unwrap();
    assert!(!node.store.contains(&bundle.id));
    assert_eq!(node.tasks(), vec![Task::search(eid("dtn://b"))]);

    let reports = node.reports.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].bundle, bundle.id);
    assert_eq!(reports[0].status, BundleStatus::Delivered);
    println!("✓ Bundle removed and delivered report emitted");

    // duplicate completion after the bundle is gone
    node.translator.notify(completed).unwrap();
    assert_eq!(node.reports.reports().len(), 1);
    assert_eq!(node.tasks(), vec![Task::search(eid("dtn://b"))]);
    println!("✓ Duplicate completion tolerated");
}

#[test]
fn test_completion_at_intermediate_hop_keeps_bundle() {
    let node = default_node();
    let bundle = singleton(1, "dtn://c/app");
    node.store_bundle(&bundle);

    node.translator
        .notify(RoutingEvent::TransferCompleted {
            peer: eid("dtn://b"),
            bundle: bundle.clone(),
        })
        .unwrap();

    assert!(node.store.contains(&bundle.id));
    assert!(node.reports.reports().is_empty());
    assert!(node.directory.has_known(&eid("dtn://b"), &bundle.id));
    assert_eq!(node.tasks(), vec![Task::search(eid("dtn://b"))]);
}

#[test]
fn test_refused_bundle_removed() {
    println!("\n=== Refusal Scenario ===\n");
    let node = default_node();
    let bundle = singleton(7, "dtn://c/app");
    node.store_bundle(&bundle);

    node.translator
        .notify(RoutingEvent::TransferAborted {
            peer: eid("dtn://c/app"),
            bundle: bundle.id.clone(),
            reason: AbortReason::Refused,
        })
        .unwrap();

    assert!(!node.store.contains(&bundle.id));
    assert_eq!(node.tasks(), vec![Task::search(eid("dtn://c"))]);
    assert!(node.reports.reports().is_empty());
    println!("✓ Undeliverable bundle dropped, search re-queued");
}

#[test]
fn test_connection_down_abort_does_nothing() {
    let node = default_node();
    let bundle = singleton(3, "dtn://d/app");
    node.store_bundle(&bundle);
    node.directory
        .try_begin_transfer(&eid("dtn://d"), &bundle.id)
        .unwrap();

    node.translator
        .notify(RoutingEvent::TransferAborted {
            peer: eid("dtn://d"),
            bundle: bundle.id.clone(),
            reason: AbortReason::ConnectionDown,
        })
        .unwrap();

    assert!(node.store.contains(&bundle.id));
    assert!(node.queue.is_empty());
    assert!(!node.directory.is_in_transit(&eid("dtn://d"), &bundle.id));
}

#[test]
fn test_incoming_bundle_fans_out_to_every_neighbor() {
    println!("\n=== Fan-out Scenario ===\n");
    let node = default_node();
    for peer in ["dtn://a", "dtn://b", "dtn://c"] {
        node.translator
            .notify(RoutingEvent::ConnectionUp { peer: eid(peer) })
            .unwrap();
    }
    node.tasks();

    let bundle = group(1, "dtn://everyone/news");
    node.store_bundle(&bundle);
    node.translator
        .notify(RoutingEvent::BundleQueued {
            bundle,
            origin: eid("dtn://local"),
        })
        .unwrap();

    let outcome = node.dispatcher.run_once().unwrap();
    assert_eq!(outcome, TaskOutcome::FannedOut { neighbors: 3 });

    let searched: HashSet<String> = node.tasks().iter().map(Task::to_string).collect();
    let expected: HashSet<String> = ["dtn://a", "dtn://b", "dtn://c"]
        .into_iter()
        .map(|peer| Task::search(eid(peer)).to_string())
        .collect();
    assert_eq!(searched, expected);
    println!("✓ One search per neighbor");
}

#[test]
fn test_group_bundle_reaches_each_neighbor_once() {
    let node = default_node();
    let bundle = group(1, "dtn://everyone/news");
    node.store_bundle(&bundle);

    for peer in ["dtn://a", "dtn://b"] {
        node.queue.push(Task::search(eid(peer))).unwrap();
        let summary = searched(node.dispatcher.run_once().unwrap());
        assert_eq!(summary.submitted, 1);

        node.translator
            .notify(RoutingEvent::TransferCompleted {
                peer: eid(peer),
                bundle: bundle.clone(),
            })
            .unwrap();
        // the requeued search finds nothing new
        let summary = searched(node.dispatcher.run_once().unwrap());
        assert_eq!(summary.candidates, 0);
    }

    assert!(node.store.contains(&bundle.id));
    assert_eq!(node.transport.submitted().len(), 2);
}

#[test]
fn test_repeated_search_is_idempotent() {
    let node = default_node();
    for seq in 0..4 {
        node.store_bundle(&singleton(seq, "dtn://b/app"));
    }

    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    node.queue.push(Task::search(eid("dtn://b"))).unwrap();

    let first = searched(node.dispatcher.run_once().unwrap());
    let second = searched(node.dispatcher.run_once().unwrap());

    assert_eq!(first.submitted, 4);
    assert!(second.candidates <= first.candidates);
    assert_eq!(second.submitted, 0);

    let submitted: HashSet<_> = node.transport.submitted_to(&eid("dtn://b")).into_iter().collect();
    assert_eq!(submitted.len(), 4);
}

#[test]
fn test_capacity_limits_and_completion_frees_slot() {
    let node = Node::new(ForwardingConfig::new(eid("dtn://local")).with_max_in_transit(2));
    let bundles: Vec<_> = (0..5).map(|seq| singleton(seq, "dtn://b/app")).collect();
    for bundle in &bundles {
        node.store_bundle(bundle);
    }

    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.submitted, 2);
    assert!(matches!(
        summary.stopped_early,
        Some(SearchStop::Reservation(ReservationError::NoMoreTransfers { limit: 2, .. }))
    ));

    let first = node.transport.submitted_to(&eid("dtn://b"))[0].clone();
    let meta = node.store.get(&first).unwrap();
    node.translator
        .notify(RoutingEvent::TransferCompleted {
            peer: eid("dtn://b/app"),
            bundle: meta,
        })
        .unwrap();

    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.submitted, 1);
    assert_eq!(node.transport.submitted().len(), 3);
}

#[test]
fn test_rejected_submission_releases_reservation() {
    let node = default_node();
    let rejected = singleton(1, "dtn://b/app");
    let accepted = singleton(2, "dtn://b/app");
    node.store_bundle(&rejected);
    node.store_bundle(&accepted);
    node.transport.reject(&rejected.id);

    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.submitted, 1);
    assert!(!node.directory.is_in_transit(&eid("dtn://b"), &rejected.id));
    assert!(node.directory.is_in_transit(&eid("dtn://b"), &accepted.id));
}

#[test]
fn test_turned_down_bundles_do_not_starve_later_ones() {
    println!("\n=== Rejected Head of Store ===\n");
    let node = default_node();
    let turned_down: Vec<_> = (0..10).map(|seq| singleton(seq, "dtn://b/app")).collect();
    for bundle in &turned_down {
        node.store_bundle(bundle);
        node.transport.reject(&bundle.id);
    }
    let good = singleton(10, "dtn://b/app");
    node.store_bundle(&good);

    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.rejected, 10);
    assert_eq!(summary.submitted, 1);
    assert_eq!(node.transport.submitted_to(&eid("dtn://b")), vec![good.id.clone()]);
    println!("✓ Bundle behind {} rejections submitted", summary.rejected);

    // turned-down bundles stay out of searches until the link comes back
    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.candidates, 0);

    node.translator
        .notify(RoutingEvent::ConnectionUp {
            peer: eid("dtn://b"),
        })
        .unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.rejected, 10);
}

#[test]
fn test_known_set_does_not_outlive_bundles() {
    println!("\n=== Known Set Pruning ===\n");
    let node = default_node();
    let peer = eid("dtn://b");

    for seq in 0..500 {
        let bundle = singleton(seq, "dtn://b/app");
        node.store_bundle(&bundle);
        node.translator
            .notify(RoutingEvent::TransferCompleted {
                peer: peer.clone(),
                bundle,
            })
            .unwrap();
    }
    assert!(node.store.is_empty());
    assert_eq!(node.directory.get(&peer).unwrap().known.len(), 0);
    println!("✓ Delivered bundles dropped from the known set");

    for seq in 500..1500 {
        let bundle = group(seq, "dtn://everyone/news");
        node.store_bundle(&bundle);
        node.translator
            .notify(RoutingEvent::TransferCompleted {
                peer: peer.clone(),
                bundle,
            })
            .unwrap();
    }
    assert_eq!(node.directory.get(&peer).unwrap().known.len(), 1000);

    let now = dtn_time_now();
    assert_eq!(node.store.purge_expired(now).len(), 1000);
    assert_eq!(node.directory.expire_known(now), 1000);
    assert_eq!(node.directory.get(&peer).unwrap().known.len(), 0);
    println!("✓ Expired bundles dropped from the known set");
}

#[test]
fn test_ipn_neighbor_served_with_index_hint() {
    let node = default_node();
    let bundle = singleton(1, "ipn:42.7");
    node.store_bundle(&bundle);
    node.store_bundle(&singleton(2, "ipn:420.7"));

    node.queue.push(Task::search(eid("ipn:42.0"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.submitted, 1);
    assert_eq!(node.transport.submitted_to(&eid("ipn:42.0")), vec![bundle.id]);
}

#[test]
fn test_unavailable_neighbor_gets_nothing() {
    let node = default_node();
    node.store_bundle(&singleton(1, "dtn://b/app"));
    node.translator
        .notify(RoutingEvent::NeighborUnavailable {
            neighbor: eid("dtn://b"),
        })
        .unwrap();
    assert!(node.queue.is_empty());

    node.queue.push(Task::search(eid("dtn://b"))).unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.submitted, 0);

    node.translator
        .notify(RoutingEvent::NeighborAvailable {
            neighbor: eid("dtn://b"),
        })
        .unwrap();
    let summary = searched(node.dispatcher.run_once().unwrap());
    assert_eq!(summary.submitted, 1);
}

#[test]
fn test_routing_service_lifecycle() {
    println!("\n=== Routing Service ===\n");
    let store = Arc::new(dtn_relay::storage::MemoryBundleStore::new(1 << 20));
    let transport = Arc::new(RecordingTransport::default());
    let reports = Arc::new(RecordingSink::default());

    let mut routing = NeighborRouting::start(
        ForwardingConfig::new(eid("dtn://local")).with_worker_name("routing-test"),
        store.clone(),
        transport.clone(),
        reports.clone(),
    )
    .unwrap();
    assert!(routing.is_running());

    let bundle = singleton(1, "dtn://b/app");
    store
        .insert(bundle.clone(), bytes::Bytes::from_static(b"hello"))
        .unwrap();

    routing
        .notify(RoutingEvent::ConnectionUp {
            peer: eid("dtn://b"),
        })
        .unwrap();
    assert!(wait_for(Duration::from_secs(2), || transport.submitted().len() == 1));
    println!("✓ Bundle submitted by dispatcher thread");

    routing
        .notify(RoutingEvent::TransferCompleted {
            peer: eid("dtn://b/app"),
            bundle: bundle.clone(),
        })
        .unwrap();
    assert!(store.is_empty());
    assert_eq!(reports.reports().len(), 1);

    routing.shutdown().unwrap();
    assert!(!routing.is_running());
    assert!(routing
        .notify(RoutingEvent::ConnectionUp {
            peer: eid("dtn://b"),
        })
        .unwrap_err()
        .is_shutdown());
    println!("✓ Dispatcher stopped on abort");
}

#[test]
fn test_invalid_config_rejected_at_start() {
    let result = NeighborRouting::start(
        ForwardingConfig::new(eid("dtn://local")).with_max_candidates(0),
        Arc::new(dtn_relay::storage::MemoryBundleStore::new(1024)),
        Arc::new(RecordingTransport::default()),
        Arc::new(RecordingSink::default()),
    );
    assert!(result.is_err());
}
