//! Per-user conversation sessions and the store that owns them

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use triage_core::{DetectedSymptom, Error, MessageEvent, Result, SessionSummary, Speaker};

/// Accumulated conversation and detection history for one user identifier
#[derive(Debug, Clone)]
pub struct Session {
    history: Vec<MessageEvent>,
    detections: Vec<DetectedSymptom>,
    last_interaction: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            detections: Vec::new(),
            last_interaction: Utc::now(),
        }
    }

    /// Append a user message and mark the interaction time
    pub fn log_user_message(&mut self, text: impl Into<String>) {
        let event = MessageEvent::user(text);
        self.last_interaction = event.timestamp;
        self.history.push(event);
    }

    /// Append an assistant reply
    pub fn log_bot_message(&mut self, text: impl Into<String>) {
        self.history.push(MessageEvent::bot(text));
    }

    /// Append detections in the order they were found
    pub fn record_detections(&mut self, detections: &[DetectedSymptom]) {
        self.detections.extend_from_slice(detections);
    }

    pub fn history(&self) -> &[MessageEvent] {
        &self.history
    }

    /// Most recently recorded detection
    pub fn latest_detection(&self) -> Option<&DetectedSymptom> {
        self.detections.last()
    }

    /// Number of user messages received
    pub fn user_message_count(&self) -> usize {
        self.history
            .iter()
            .filter(|e| e.speaker == Speaker::User)
            .count()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            interaction_count: self.user_message_count(),
            symptom_phrases: self.detections.iter().map(|d| d.phrase.clone()).collect(),
            last_seen: self.last_interaction,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, individually locked session.
///
/// Holding the lock for a whole classification call serializes concurrent
/// calls for the same identifier.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Owner of all live sessions, keyed by user identifier.
///
/// A session is ACTIVE from its first `open` until `remove`; there is no
/// expiry.
pub trait SessionStore: Send + Sync {
    /// Return the session for `user_id`, creating it if absent
    fn open(&self, user_id: &str) -> Result<SessionHandle>;

    /// Return the session for `user_id` without creating one
    fn get(&self, user_id: &str) -> Option<SessionHandle>;

    /// Drop the session; returns whether one existed
    fn remove(&self, user_id: &str) -> bool;

    /// Number of live sessions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-memory session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    max_sessions: Option<usize>,
}

impl InMemorySessionStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses to open more than `max_sessions` sessions
    pub fn with_limit(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: Some(max_sessions),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn open(&self, user_id: &str) -> Result<SessionHandle> {
        if let Some(handle) = self.sessions.read().get(user_id) {
            return Ok(handle.clone());
        }

        let mut sessions = self.sessions.write();

        // Another caller may have created it between the two locks
        if let Some(handle) = sessions.get(user_id) {
            return Ok(handle.clone());
        }

        if let Some(limit) = self.max_sessions {
            if sessions.len() >= limit {
                return Err(Error::SessionLimit { limit });
            }
        }

        debug!(sessions = sessions.len() + 1, "Opening new session");
        let handle = Arc::new(Mutex::new(Session::new()));
        sessions.insert(user_id.to_string(), handle.clone());
        Ok(handle)
    }

    fn get(&self, user_id: &str) -> Option<SessionHandle> {
        self.sessions.read().get(user_id).cloned()
    }

    fn remove(&self, user_id: &str) -> bool {
        self.sessions.write().remove(user_id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
