//! Triage Core
//!
//! Core types and error handling shared across the triage assistant crates.
//!
//! This crate provides:
//! - Error types and result handling
//! - Clinical value types (severity, recommended care level, onset duration)
//! - Symptom table entries and detection records
//! - Conversation events and session summaries

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    DetectedSymptom, DurationClass, MessageEvent, Recommendation, SessionSummary, Severity,
    Speaker, SymptomEntry,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        DetectedSymptom, DurationClass, MessageEvent, Recommendation, SessionSummary, Severity,
        Speaker, SymptomEntry,
    };
}
