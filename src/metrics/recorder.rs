//! Metrics recorder for forwarding operations

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    describe_counter!(
        "dtn_routing_tasks_processed_total",
        "Total number of routing tasks processed"
    );
    describe_counter!(
        "dtn_routing_tasks_failed_total",
        "Routing tasks that failed with an unexpected error"
    );
    describe_counter!(
        "dtn_routing_bundles_submitted_total",
        "Bundles handed to the transport layer"
    );
    describe_counter!(
        "dtn_routing_in_transit_skips_total",
        "Candidates skipped because they were already in transit"
    );
    describe_counter!(
        "dtn_routing_transport_rejections_total",
        "Submissions rejected immediately by the transport layer"
    );
    describe_counter!(
        "dtn_routing_searches_stopped_total",
        "Searches stopped early by neighbor capacity or availability"
    );
    describe_counter!(
        "dtn_routing_bundles_delivered_total",
        "Singleton bundles delivered to their destination and removed"
    );
    describe_counter!(
        "dtn_routing_refused_removed_total",
        "Singleton bundles removed after their destination refused them"
    );

    describe_gauge!("dtn_routing_queue_depth", "Pending routing tasks");

    describe_histogram!(
        "dtn_routing_candidates_per_search",
        "Candidates returned by one bounded store query"
    );
    describe_histogram!(
        "dtn_routing_task_duration_seconds",
        "Time spent executing one routing task"
    );
}

// ============== Task Operations ==============

/// Record a task being processed
pub fn record_task(kind: &'static str) {
    counter!("dtn_routing_tasks_processed_total", "kind" => kind).increment(1);
}

/// Record a task failing with an unexpected error
pub fn record_task_failed(kind: &'static str) {
    counter!("dtn_routing_tasks_failed_total", "kind" => kind).increment(1);
}

/// Update queue depth gauge
pub fn set_queue_depth(depth: usize) {
    gauge!("dtn_routing_queue_depth").set(depth as f64);
}

// ============== Search Operations ==============

/// Record the size of one candidate query result
pub fn record_candidates(count: usize) {
    histogram!("dtn_routing_candidates_per_search").record(count as f64);
}

pub fn record_bundle_submitted() {
    counter!("dtn_routing_bundles_submitted_total").increment(1);
}

pub fn record_in_transit_skip() {
    counter!("dtn_routing_in_transit_skips_total").increment(1);
}

pub fn record_transport_rejected() {
    counter!("dtn_routing_transport_rejections_total").increment(1);
}

/// Record a search ending before all candidates were tried
pub fn record_search_stopped(reason: &'static str) {
    counter!("dtn_routing_searches_stopped_total", "reason" => reason).increment(1);
}

// ============== Event Outcomes ==============

pub fn record_delivery() {
    counter!("dtn_routing_bundles_delivered_total").increment(1);
}

pub fn record_refused_removal() {
    counter!("dtn_routing_refused_removed_total").increment(1);
}

/// Helper struct to time task execution
pub struct TaskTimer {
    start_time: Instant,
}

impl TaskTimer {
    pub fn start() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Stop timing and record the duration
    pub fn stop(self) {
        histogram!("dtn_routing_task_duration_seconds")
            .record(self.start_time.elapsed().as_secs_f64());
    }
}
