//! Compiled rule set

use crate::config::RulesConfig;
use crate::patterns::PhraseMatcher;
use crate::responses::ResponseCatalog;
use triage_core::{DetectedSymptom, DurationClass, Result, Severity, SymptomEntry};

/// Informational intents, in the priority order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Appointment,
    Hours,
    Medication,
    Insurance,
}

/// Rule tables compiled into matchers, ready to run against normalized text.
///
/// All lookups expect the message to be trimmed and lowercased already.
#[derive(Debug)]
pub struct RuleSet {
    symptoms: Vec<SymptomEntry>,
    symptom_matcher: PhraseMatcher,
    emergency: PhraseMatcher,
    greetings: PhraseMatcher,
    follow_ups: PhraseMatcher,
    severity_values: Vec<Severity>,
    severity_matcher: PhraseMatcher,
    duration_values: Vec<DurationClass>,
    duration_matcher: PhraseMatcher,
    intents: [(Intent, PhraseMatcher); 4],
    responses: ResponseCatalog,
}

impl RuleSet {
    /// Compile a validated configuration
    pub fn from_config(config: RulesConfig) -> Result<Self> {
        config.validate()?;

        let RulesConfig {
            symptoms,
            emergency_keywords,
            greetings,
            follow_up_phrases,
            severity_modifiers,
            duration_keywords,
            intents,
            responses,
        } = config;

        let symptom_matcher = PhraseMatcher::new(symptoms.iter().map(|s| s.phrase.clone()))?;
        let severity_matcher =
            PhraseMatcher::new(severity_modifiers.iter().map(|m| m.word.clone()))?;
        let duration_matcher =
            PhraseMatcher::new(duration_keywords.iter().map(|d| d.word.clone()))?;

        Ok(Self {
            symptom_matcher,
            symptoms,
            emergency: PhraseMatcher::new(emergency_keywords)?,
            greetings: PhraseMatcher::new(greetings)?,
            follow_ups: PhraseMatcher::new(follow_up_phrases)?,
            severity_values: severity_modifiers.iter().map(|m| m.severity).collect(),
            severity_matcher,
            duration_values: duration_keywords.iter().map(|d| d.duration).collect(),
            duration_matcher,
            intents: [
                (Intent::Appointment, PhraseMatcher::new(intents.appointment)?),
                (Intent::Hours, PhraseMatcher::new(intents.hours)?),
                (Intent::Medication, PhraseMatcher::new(intents.medication)?),
                (Intent::Insurance, PhraseMatcher::new(intents.insurance)?),
            ],
            responses,
        })
    }

    /// Rule set over the built-in tables
    pub fn builtin() -> Result<Self> {
        Self::from_config(RulesConfig::default())
    }

    pub fn responses(&self) -> &ResponseCatalog {
        &self.responses
    }

    pub fn is_greeting(&self, text: &str) -> bool {
        self.greetings.is_match(text)
    }

    pub fn is_follow_up(&self, text: &str) -> bool {
        self.follow_ups.is_match(text)
    }

    /// Every contained emergency keyword, in table order
    pub fn emergency_matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.emergency.matched_phrases(text)
    }

    /// Every contained symptom with severity and duration resolved.
    ///
    /// Modifiers are resolved once per message, so all detections from the
    /// same message share the same override and duration.
    pub fn detect_symptoms(&self, text: &str) -> Vec<DetectedSymptom> {
        let indices = self.symptom_matcher.matched_indices(text);
        if indices.is_empty() {
            return Vec::new();
        }

        let severity_override = self
            .severity_matcher
            .first_match(text)
            .map(|index| self.severity_values[index]);
        let duration = self
            .duration_matcher
            .first_match(text)
            .map(|index| self.duration_values[index])
            .unwrap_or_default();

        indices
            .into_iter()
            .map(|index| {
                let entry = &self.symptoms[index];
                let severity = severity_override.unwrap_or(entry.severity);
                DetectedSymptom::from_entry(entry, severity, duration)
            })
            .collect()
    }

    /// First informational intent whose keywords are contained
    pub fn intent(&self, text: &str) -> Option<Intent> {
        self.intents
            .iter()
            .find(|(_, matcher)| matcher.is_match(text))
            .map(|(intent, _)| *intent)
    }

    /// Canned reply for an intent
    pub fn intent_response(&self, intent: Intent) -> &str {
        match intent {
            Intent::Appointment => &self.responses.appointment,
            Intent::Hours => &self.responses.hours,
            Intent::Medication => &self.responses.medication,
            Intent::Insurance => &self.responses.insurance,
        }
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn emergency_keyword_count(&self) -> usize {
        self.emergency.len()
    }
}
