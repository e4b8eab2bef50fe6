//! Core types for the triage assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical severity of a symptom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended level of care for a symptom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Nurse consultation
    Nurse,
    /// General practitioner appointment
    Gp,
    /// Emergency services
    Emergency,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nurse => "nurse",
            Self::Gp => "gp",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onset classification derived from duration keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Acute,
    Chronic,
    /// No duration keyword was present
    #[default]
    Unknown,
}

impl DurationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acute => "acute",
            Self::Chronic => "chronic",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the static symptom table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    /// Symptom phrase matched against messages
    pub phrase: String,

    /// Baseline severity before modifiers
    pub severity: Severity,

    /// Recommended care level
    pub recommendation: Recommendation,

    /// Free-text clinical category (e.g. "respiratory")
    pub category: String,
}

impl SymptomEntry {
    /// Create a new symptom entry
    pub fn new(
        phrase: impl Into<String>,
        severity: Severity,
        recommendation: Recommendation,
        category: impl Into<String>,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            severity,
            recommendation,
            category: category.into(),
        }
    }
}

/// A symptom detected in a message, with modifiers resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSymptom {
    /// Raw symptom phrase as it appears in the symptom table
    pub phrase: String,

    /// Severity after applying any severity modifier
    pub severity: Severity,

    pub recommendation: Recommendation,

    pub category: String,

    pub duration: DurationClass,
}

impl DetectedSymptom {
    /// Build a detection from a table entry and the resolved modifiers
    pub fn from_entry(entry: &SymptomEntry, severity: Severity, duration: DurationClass) -> Self {
        Self {
            phrase: entry.phrase.clone(),
            severity,
            recommendation: entry.recommendation,
            category: entry.category.clone(),
            duration,
        }
    }
}

/// Who produced a conversation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// A single timestamped message in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub speaker: Speaker,

    /// Message text (normalized for user messages)
    pub text: String,

    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    /// Create a user message event stamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a bot message event stamped now
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Snapshot of a session for administrative inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Number of user messages received
    pub interaction_count: usize,

    /// Detected symptom phrases in detection order
    pub symptom_phrases: Vec<String>,

    /// Time of the most recent message
    pub last_seen: DateTime<Utc>,
}

impl SessionSummary {
    /// Format used when presenting `last_seen` to humans
    pub const LAST_SEEN_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// `last_seen` rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn last_seen_display(&self) -> String {
        self.last_seen.format(Self::LAST_SEEN_FORMAT).to_string()
    }
}
