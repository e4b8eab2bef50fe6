//! Message classifier: the ordered rule cascade

use crate::rules::{Intent, RuleSet};
use crate::session::{Session, SessionStore};
use std::sync::Arc;
use tracing::{debug, error};
use triage_core::{Result, SessionSummary};

/// Identifier used when the caller does not supply one
pub const DEFAULT_USER_ID: &str = "default";

/// Which rule produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Greeting,
    FollowUp,
    Emergency,
    Symptoms,
    Appointment,
    Hours,
    Medication,
    Insurance,
    Default,
    /// Internal fault flattened into the apology text
    Error,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::FollowUp => "follow_up",
            Self::Emergency => "emergency",
            Self::Symptoms => "symptoms",
            Self::Appointment => "appointment",
            Self::Hours => "hours",
            Self::Medication => "medication",
            Self::Insurance => "insurance",
            Self::Default => "default",
            Self::Error => "error",
        }
    }
}

impl From<Intent> for Branch {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Appointment => Self::Appointment,
            Intent::Hours => Self::Hours,
            Intent::Medication => Self::Medication,
            Intent::Insurance => Self::Insurance,
        }
    }
}

/// Response text plus the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub branch: Branch,
}

impl Reply {
    fn new(text: impl Into<String>, branch: Branch) -> Self {
        Self {
            text: text.into(),
            branch,
        }
    }
}

/// Rule-based triage classifier.
///
/// Each call normalizes the message (trim, lowercase), logs it to the
/// caller's session and walks the cascade
/// greeting → follow-up → emergency → symptoms → intents → default,
/// answering with the first rule that matches.
pub struct MessageClassifier {
    rules: Arc<RuleSet>,
    store: Arc<dyn SessionStore>,
}

impl MessageClassifier {
    /// Create a classifier over compiled rules and an injected session store
    pub fn new(rules: Arc<RuleSet>, store: Arc<dyn SessionStore>) -> Self {
        Self { rules, store }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Classify a message and return the response text. Never fails.
    pub fn process(&self, message: &str, user_id: &str) -> String {
        self.respond(message, user_id).text
    }

    /// Classify a message, reporting which rule answered.
    ///
    /// Internal faults are logged and turned into the apology reply.
    pub fn respond(&self, message: &str, user_id: &str) -> Reply {
        match self.try_respond(message, user_id) {
            Ok(reply) => {
                debug!(branch = reply.branch.as_str(), "Message classified");
                reply
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Failed to process message");
                Reply::new(self.rules.responses().apology.clone(), Branch::Error)
            }
        }
    }

    fn try_respond(&self, message: &str, user_id: &str) -> Result<Reply> {
        let text = message.trim().to_lowercase();

        let handle = self.store.open(user_id)?;
        let mut session = handle.lock();

        session.log_user_message(text.as_str());
        let reply = self.classify(&text, &mut session);
        session.log_bot_message(reply.text.as_str());

        Ok(reply)
    }

    fn classify(&self, text: &str, session: &mut Session) -> Reply {
        let rules = &self.rules;

        if rules.is_greeting(text) {
            return Reply::new(rules.responses().greeting.clone(), Branch::Greeting);
        }

        if rules.is_follow_up(text) {
            return self.follow_up(text, session);
        }

        if let Some(reply) = self.check_emergency(text) {
            return reply;
        }

        if let Some(reply) = self.check_symptoms(text, session) {
            return reply;
        }

        if let Some(intent) = rules.intent(text) {
            return Reply::new(rules.intent_response(intent), Branch::from(intent));
        }

        Reply::new(rules.responses().fallback.clone(), Branch::Default)
    }

    /// Follow-up questions re-run escalation and detection on the message,
    /// then fall back to advice for the most recent detection
    fn follow_up(&self, text: &str, session: &mut Session) -> Reply {
        if let Some(reply) = self.check_emergency(text) {
            return reply;
        }

        if let Some(reply) = self.check_symptoms(text, session) {
            return reply;
        }

        let responses = self.rules.responses();
        match session.latest_detection() {
            Some(latest) => Reply::new(responses.follow_up(latest), Branch::FollowUp),
            None => Reply::new(responses.follow_up_no_context.clone(), Branch::FollowUp),
        }
    }

    fn check_emergency(&self, text: &str) -> Option<Reply> {
        let matches = self.rules.emergency_matches(text);
        if matches.is_empty() {
            return None;
        }

        debug!(matches = matches.len(), "Emergency keywords detected");
        Some(Reply::new(
            self.rules.responses().emergency(&matches),
            Branch::Emergency,
        ))
    }

    fn check_symptoms(&self, text: &str, session: &mut Session) -> Option<Reply> {
        let detected = self.rules.detect_symptoms(text);
        if detected.is_empty() {
            return None;
        }

        session.record_detections(&detected);
        Some(Reply::new(
            self.rules.responses().symptom_report(&detected),
            Branch::Symptoms,
        ))
    }

    /// Summary of a user's session, or `SessionNotFound`
    pub fn summary(&self, user_id: &str) -> Result<SessionSummary> {
        let handle = self
            .store
            .get(user_id)
            .ok_or_else(|| triage_core::Error::SessionNotFound(user_id.to_string()))?;
        let summary = handle.lock().summary();
        Ok(summary)
    }

    /// Remove a user's session; returns whether one existed
    pub fn clear_session(&self, user_id: &str) -> bool {
        let existed = self.store.remove(user_id);
        if existed {
            debug!("Session cleared");
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;

    fn classifier() -> MessageClassifier {
        MessageClassifier::new(
            Arc::new(RuleSet::builtin().unwrap()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    #[test]
    fn test_greeting_wins_over_symptoms() {
        let classifier = classifier();
        let reply = classifier.respond("Hello, I have a cough", "u1");

        assert_eq!(reply.branch, Branch::Greeting);
        // nothing recorded because the cascade stopped at the greeting
        assert!(classifier.summary("u1").unwrap().symptom_phrases.is_empty());
    }

    #[test]
    fn test_follow_up_without_context() {
        let classifier = classifier();
        let reply = classifier.respond("What should I do?", "u1");

        assert_eq!(reply.branch, Branch::FollowUp);
        assert_eq!(
            reply.text,
            classifier.rules().responses().follow_up_no_context
        );
    }

    #[test]
    fn test_follow_up_uses_latest_detection() {
        let classifier = classifier();
        classifier.process("I am dealing with back pain", "u1");

        let reply = classifier.respond("what should i do now", "u1");
        assert_eq!(reply.branch, Branch::FollowUp);
        assert!(reply.text.contains("back pain"));
        assert!(reply.text.contains("GP"));
    }

    #[test]
    fn test_follow_up_escalates_emergencies() {
        let classifier = classifier();
        let reply = classifier.respond("what should i do about chest pain", "u1");

        assert_eq!(reply.branch, Branch::Emergency);
        assert!(reply.text.contains("chest pain"));
    }

    #[test]
    fn test_follow_up_detects_new_symptoms() {
        let classifier = classifier();
        let reply = classifier.respond("how long does a sore throat last", "u1");

        assert_eq!(reply.branch, Branch::Symptoms);
        assert_eq!(classifier.summary("u1").unwrap().symptom_phrases, vec!["sore throat"]);
    }

    #[test]
    fn test_intents() {
        let classifier = classifier();

        assert_eq!(classifier.respond("I need an appointment", "u1").branch, Branch::Appointment);
        assert_eq!(classifier.respond("are you open on sunday", "u1").branch, Branch::Hours);
        assert_eq!(classifier.respond("can i get a refill of my pills", "u1").branch, Branch::Medication);
        assert_eq!(classifier.respond("do you take my insurance", "u1").branch, Branch::Insurance);
        assert_eq!(classifier.respond("tell me about the weather", "u1").branch, Branch::Default);
    }

    #[test]
    fn test_bot_replies_are_logged() {
        let classifier = classifier();
        let reply = classifier.process("tell me about the weather", "u1");

        let handle = classifier.store().get("u1").unwrap();
        let session = handle.lock();
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].text, "tell me about the weather");
        assert_eq!(session.history()[1].text, reply);
    }

    #[test]
    fn test_branch_labels() {
        assert_eq!(Branch::FollowUp.as_str(), "follow_up");
        assert_eq!(Branch::from(Intent::Hours), Branch::Hours);
    }
}
