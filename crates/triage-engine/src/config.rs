//! Configuration for rule tables and responses

use crate::responses::{ResponseCatalog, MATCHES_PLACEHOLDER, SYMPTOM_PLACEHOLDER};
use crate::tables;
use serde::{Deserialize, Serialize};
use std::path::Path;
use triage_core::{DurationClass, Error, Result, Severity, SymptomEntry};

/// Complete rule configuration: every table the classifier matches against
/// plus the response catalog.
///
/// Sections omitted from a YAML document keep their built-in values, so a file
/// may override just the clinic hours text or just the greeting list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Symptom table, in detection order
    pub symptoms: Vec<SymptomEntry>,

    /// Phrases that escalate immediately
    pub emergency_keywords: Vec<String>,

    pub greetings: Vec<String>,

    pub follow_up_phrases: Vec<String>,

    /// Ordered severity overrides; the first contained word wins
    pub severity_modifiers: Vec<SeverityModifier>,

    /// Ordered duration keywords; the first contained word wins
    pub duration_keywords: Vec<DurationKeyword>,

    pub intents: IntentKeywords,

    pub responses: ResponseCatalog,
}

/// Word that overrides a detected symptom's severity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityModifier {
    pub word: String,
    pub severity: Severity,
}

/// Word that classifies a symptom's onset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationKeyword {
    pub word: String,
    pub duration: DurationClass,
}

/// Keyword sets for the informational intents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentKeywords {
    pub appointment: Vec<String>,
    pub hours: Vec<String>,
    pub medication: Vec<String>,
    pub insurance: Vec<String>,
}

impl Default for IntentKeywords {
    fn default() -> Self {
        Self {
            appointment: owned(tables::APPOINTMENT_KEYWORDS),
            hours: owned(tables::HOURS_KEYWORDS),
            medication: owned(tables::MEDICATION_KEYWORDS),
            insurance: owned(tables::INSURANCE_KEYWORDS),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            symptoms: tables::SYMPTOMS
                .iter()
                .map(|&(phrase, severity, recommendation, category)| {
                    SymptomEntry::new(phrase, severity, recommendation, category)
                })
                .collect(),
            emergency_keywords: owned(tables::EMERGENCY_KEYWORDS),
            greetings: owned(tables::GREETINGS),
            follow_up_phrases: owned(tables::FOLLOW_UP_PHRASES),
            severity_modifiers: tables::SEVERITY_MODIFIERS
                .iter()
                .map(|&(word, severity)| SeverityModifier {
                    word: word.to_string(),
                    severity,
                })
                .collect(),
            duration_keywords: tables::DURATION_KEYWORDS
                .iter()
                .map(|&(word, duration)| DurationKeyword {
                    word: word.to_string(),
                    duration,
                })
                .collect(),
            intents: IntentKeywords::default(),
            responses: ResponseCatalog::default(),
        }
    }
}

impl RulesConfig {
    /// Load from YAML string, normalizing and validating the result
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse rules: {}", e)))?;

        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read rules file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Trim and lowercase every phrase so matching against normalized
    /// messages stays consistent
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.symptoms {
            entry.phrase = normalize(&entry.phrase);
        }
        normalize_all(&mut self.emergency_keywords);
        normalize_all(&mut self.greetings);
        normalize_all(&mut self.follow_up_phrases);
        for modifier in &mut self.severity_modifiers {
            modifier.word = normalize(&modifier.word);
        }
        for keyword in &mut self.duration_keywords {
            keyword.word = normalize(&keyword.word);
        }
        normalize_all(&mut self.intents.appointment);
        normalize_all(&mut self.intents.hours);
        normalize_all(&mut self.intents.medication);
        normalize_all(&mut self.intents.insurance);
        self
    }

    /// Check the configuration can drive the classifier
    pub fn validate(&self) -> Result<()> {
        if self.symptoms.is_empty() {
            return Err(Error::config("symptom table is empty"));
        }
        if self.emergency_keywords.is_empty() {
            return Err(Error::config("emergency keyword list is empty"));
        }

        check_phrases("symptoms", self.symptoms.iter().map(|s| s.phrase.as_str()))?;
        check_phrases("emergency_keywords", self.emergency_keywords.iter().map(String::as_str))?;
        check_phrases("greetings", self.greetings.iter().map(String::as_str))?;
        check_phrases("follow_up_phrases", self.follow_up_phrases.iter().map(String::as_str))?;
        check_phrases(
            "severity_modifiers",
            self.severity_modifiers.iter().map(|m| m.word.as_str()),
        )?;
        check_phrases(
            "duration_keywords",
            self.duration_keywords.iter().map(|d| d.word.as_str()),
        )?;
        check_phrases("intents.appointment", self.intents.appointment.iter().map(String::as_str))?;
        check_phrases("intents.hours", self.intents.hours.iter().map(String::as_str))?;
        check_phrases("intents.medication", self.intents.medication.iter().map(String::as_str))?;
        check_phrases("intents.insurance", self.intents.insurance.iter().map(String::as_str))?;

        if let Some(keyword) = self
            .duration_keywords
            .iter()
            .find(|d| d.duration == DurationClass::Unknown)
        {
            return Err(Error::config(format!(
                "duration keyword '{}' maps to unknown",
                keyword.word
            )));
        }

        let responses = &self.responses;
        if !responses.emergency.contains(MATCHES_PLACEHOLDER) {
            return Err(Error::config(format!(
                "emergency response must contain {}",
                MATCHES_PLACEHOLDER
            )));
        }
        for (name, template) in [
            ("follow_up_nurse", &responses.follow_up_nurse),
            ("follow_up_gp", &responses.follow_up_gp),
            ("follow_up_emergency", &responses.follow_up_emergency),
        ] {
            if !template.contains(SYMPTOM_PLACEHOLDER) {
                return Err(Error::config(format!(
                    "{} response must contain {}",
                    name, SYMPTOM_PLACEHOLDER
                )));
            }
        }

        Ok(())
    }
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

fn normalize(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

fn normalize_all(phrases: &mut [String]) {
    for phrase in phrases {
        *phrase = normalize(phrase);
    }
}

fn check_phrases<'a>(table: &str, phrases: impl Iterator<Item = &'a str>) -> Result<()> {
    for (index, phrase) in phrases.enumerate() {
        if phrase.is_empty() {
            return Err(Error::config(format!(
                "{}: empty phrase at position {}",
                table, index
            )));
        }
    }
    Ok(())
}
