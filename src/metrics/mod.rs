//! Metrics and observability module
//!
//! Prometheus-compatible metrics for the forwarding core.
//!
//! Key metrics exposed:
//! - Tasks processed per kind
//! - Bundle submissions, in-transit skips and transport rejections
//! - Early search stops per reason
//! - Singleton deliveries and refused bundles removed
//! - Task queue depth

pub mod exporter;
pub mod recorder;

pub use exporter::{render_metrics, start_metrics_server, MetricsConfig, MetricsError};
pub use recorder::{
    init_metrics, record_bundle_submitted, record_candidates, record_delivery,
    record_in_transit_skip, record_refused_removal, record_search_stopped, record_task,
    record_task_failed, record_transport_rejected, set_queue_depth, TaskTimer,
};
