//! Metrics collection and reporting
//!
//! Counters are kept twice: as process-local atomics for the stats snapshot,
//! and through the `metrics` facade for the Prometheus exporter.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const MESSAGES_TOTAL: &str = "triage_messages_total";
pub const ERRORS_TOTAL: &str = "triage_errors_total";
pub const CLASSIFY_LATENCY_US: &str = "triage_classify_latency_us";
pub const SESSIONS_CLEARED_TOTAL: &str = "triage_sessions_cleared_total";

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(MESSAGES_TOTAL, "Total messages classified, by branch");
    metrics::describe_counter!(ERRORS_TOTAL, "Total processing errors, by kind");
    metrics::describe_histogram!(
        CLASSIFY_LATENCY_US,
        metrics::Unit::Microseconds,
        "Classification latency in microseconds"
    );
    metrics::describe_counter!(SESSIONS_CLEARED_TOTAL, "Total sessions cleared");
}

/// Collector for chat traffic
#[derive(Clone, Default)]
pub struct ChatMetrics {
    inner: Arc<ChatMetricsInner>,
}

#[derive(Default)]
struct ChatMetricsInner {
    total_messages: AtomicU64,
    emergencies: AtomicU64,
    symptom_reports: AtomicU64,
    errors: AtomicU64,
    total_latency_us: AtomicU64,
    sessions_cleared: AtomicU64,
}

impl ChatMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified message under its branch label
    pub fn record_message(&self, branch: &'static str, latency_us: u64) {
        let inner = &self.inner;
        inner.total_messages.fetch_add(1, Ordering::Relaxed);
        inner.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        match branch {
            "emergency" => {
                inner.emergencies.fetch_add(1, Ordering::Relaxed);
            }
            "symptoms" => {
                inner.symptom_reports.fetch_add(1, Ordering::Relaxed);
            }
            "error" => {
                inner.errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        metrics::counter!(MESSAGES_TOTAL, "branch" => branch).increment(1);
        metrics::histogram!(CLASSIFY_LATENCY_US).record(latency_us as f64);
    }

    /// Record a fault outside classification (e.g. transcript writes)
    pub fn record_error(&self, kind: &'static str) {
        self.inner.errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    }

    pub fn record_session_cleared(&self) {
        self.inner.sessions_cleared.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(SESSIONS_CLEARED_TOTAL).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            total_messages: inner.total_messages.load(Ordering::Relaxed),
            emergencies: inner.emergencies.load(Ordering::Relaxed),
            symptom_reports: inner.symptom_reports.load(Ordering::Relaxed),
            errors: inner.errors.load(Ordering::Relaxed),
            total_latency_us: inner.total_latency_us.load(Ordering::Relaxed),
            sessions_cleared: inner.sessions_cleared.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_messages: u64,
    pub emergencies: u64,
    pub symptom_reports: u64,
    pub errors: u64,
    pub total_latency_us: u64,
    pub sessions_cleared: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per message
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_messages == 0 {
            0
        } else {
            self.total_latency_us / self.total_messages
        }
    }

    /// Share of messages that escalated to emergency
    pub fn emergency_rate(&self) -> f64 {
        if self.total_messages == 0 {
            0.0
        } else {
            self.emergencies as f64 / self.total_messages as f64
        }
    }
}
