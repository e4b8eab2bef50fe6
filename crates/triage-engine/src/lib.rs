//! Triage Engine
//!
//! Rule-based message classification for the clinic triage assistant.
//!
//! Every message runs through one ordered cascade, first match wins:
//! - Greeting phrases
//! - Follow-up questions (re-checked for emergencies and symptoms, then
//!   answered from the session's latest detection)
//! - Emergency keywords (every match is listed in the escalation)
//! - Symptom table with severity and duration modifiers
//! - Appointment, hours, medication and insurance intents
//! - Default reply
//!
//! Matching is case-insensitive substring containment over small ordered
//! tables; there is no tokenization and no word-boundary check.

pub mod classifier;
pub mod config;
pub mod patterns;
pub mod responses;
pub mod rules;
pub mod session;
pub mod tables;

pub use classifier::{Branch, MessageClassifier, Reply, DEFAULT_USER_ID};
pub use config::{DurationKeyword, IntentKeywords, RulesConfig, SeverityModifier};
pub use patterns::PhraseMatcher;
pub use responses::{title_case, ResponseCatalog};
pub use rules::{Intent, RuleSet};
pub use session::{InMemorySessionStore, Session, SessionHandle, SessionStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Branch, MessageClassifier, Reply};
    pub use crate::config::RulesConfig;
    pub use crate::rules::RuleSet;
    pub use crate::session::{InMemorySessionStore, SessionStore};
}
