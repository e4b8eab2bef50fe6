//! Triage Telemetry
//!
//! Record keeping around the triage classifier.
//!
//! Provides:
//! - Chat transcript persistence (JSON lines, rotation, hashed session ids)
//! - Traffic metrics with a Prometheus-facing facade

pub mod metrics;
pub mod transcript;

pub use metrics::{describe_metrics, ChatMetrics, MetricsSnapshot};
pub use transcript::{
    hash_session_id, TranscriptConfig, TranscriptQuery, TranscriptReader, TranscriptRecord,
    TranscriptWriter,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::ChatMetrics;
    pub use crate::transcript::{TranscriptConfig, TranscriptRecord, TranscriptWriter};
}
