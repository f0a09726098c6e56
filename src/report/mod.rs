//! Bundle status reports
//!
//! Reports are fire-and-forget: the routing core emits them and never waits
//! for the reporting subsystem.

use crate::bundle::BundleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleStatus {
    Received,
    Forwarded,
    Delivered,
    Deleted,
}

/// Status report reason codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    NoAdditionalInformation,
    LifetimeExpired,
    DepletedStorage,
    NoKnownRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub bundle: BundleId,
    pub status: BundleStatus,
    pub reason: ReasonCode,
    pub created_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(bundle: BundleId, status: BundleStatus, reason: ReasonCode) -> Self {
        Self {
            bundle,
            status,
            reason,
            created_at: Utc::now(),
        }
    }

    /// A singleton bundle reached its destination and left local storage
    pub fn delivered(bundle: BundleId) -> Self {
        Self::new(bundle, BundleStatus::Delivered, ReasonCode::DepletedStorage)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:?}): {}", self.status, self.reason, self.bundle)
    }
}

/// Consumer of status reports
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: StatusReport);
}

impl ReportSink for mpsc::UnboundedSender<StatusReport> {
    fn emit(&self, report: StatusReport) {
        if self.send(report).is_err() {
            tracing::debug!("status report dropped, receiver closed");
        }
    }
}

/// Sink that only logs reports
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, report: StatusReport) {
        tracing::info!(%report, "status report");
    }
}

/// Channel-backed sink plus the receiving end for the reporting subsystem
pub fn channel() -> (
    mpsc::UnboundedSender<StatusReport>,
    mpsc::UnboundedReceiver<StatusReport>,
) {
    mpsc::unbounded_channel()
}
