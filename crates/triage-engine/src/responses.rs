//! Canned response catalog and rendering

use serde::{Deserialize, Serialize};
use triage_core::{DetectedSymptom, Recommendation};

/// Placeholder replaced by the comma-separated emergency matches
pub const MATCHES_PLACEHOLDER: &str = "{matches}";

/// Placeholder replaced by a symptom phrase in follow-up advice
pub const SYMPTOM_PLACEHOLDER: &str = "{symptom}";

/// Every text the assistant can answer with.
///
/// Fields left out of a YAML document fall back to the built-in wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCatalog {
    pub greeting: String,

    /// Must contain `{matches}`
    pub emergency: String,

    /// First line of a symptom report
    pub symptom_header: String,

    /// Last line of a symptom report
    pub symptom_advisory: String,

    pub appointment: String,
    pub hours: String,
    pub medication: String,
    pub insurance: String,

    /// Reply when no rule matched
    pub fallback: String,

    /// Reply for any internal processing fault
    pub apology: String,

    /// Follow-up advice templates, each must contain `{symptom}`
    pub follow_up_nurse: String,
    pub follow_up_gp: String,
    pub follow_up_emergency: String,

    /// Follow-up question with nothing detected yet
    pub follow_up_no_context: String,
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm your AI Health Assistant. Describe your symptoms so I can guide you."
                .to_string(),
            emergency: "EMERGENCY DETECTED: {matches}. Please call 911 or go to the ER immediately."
                .to_string(),
            symptom_header: "Symptom(s) detected:".to_string(),
            symptom_advisory: "Please consider consulting a healthcare provider.".to_string(),
            appointment: "To book an appointment, visit our website or call during business hours."
                .to_string(),
            hours: "Clinic hours: Mon-Fri 8am-6pm, Sat 9am-4pm, Sun closed.".to_string(),
            medication:
                "For medication advice, please consult your healthcare provider or pharmacist."
                    .to_string(),
            insurance: "Please bring your insurance card. Copay and coverage may vary by plan."
                .to_string(),
            fallback: "I'm here to assist with symptoms, appointments, and health info. Please describe how you're feeling."
                .to_string(),
            apology: "An error occurred. Please try again or rephrase your question.".to_string(),
            follow_up_nurse: "For your {symptom}, rest and keep an eye on it. A nurse consultation can help if it does not improve within a few days."
                .to_string(),
            follow_up_gp: "For your {symptom}, we recommend booking an appointment with a GP.".to_string(),
            follow_up_emergency: "Your {symptom} needs urgent attention. Please call 911 or go to the ER immediately."
                .to_string(),
            follow_up_no_context: "Could you describe your symptoms first? Then I can suggest next steps."
                .to_string(),
        }
    }
}

impl ResponseCatalog {
    /// Emergency escalation listing every matched phrase
    pub fn emergency(&self, matches: &[&str]) -> String {
        self.emergency
            .replace(MATCHES_PLACEHOLDER, &matches.join(", "))
    }

    /// Multi-line report enumerating each detection
    pub fn symptom_report(&self, symptoms: &[DetectedSymptom]) -> String {
        let mut lines = Vec::with_capacity(symptoms.len() + 2);
        lines.push(self.symptom_header.clone());
        lines.extend(symptoms.iter().map(|s| {
            format!(
                "{} (Severity: {}, Duration: {})",
                title_case(&s.phrase),
                title_case(s.severity.as_str()),
                s.duration
            )
        }));
        lines.push(self.symptom_advisory.clone());
        lines.join("\n")
    }

    /// Next-step advice for a previously detected symptom
    pub fn follow_up(&self, symptom: &DetectedSymptom) -> String {
        let template = match symptom.recommendation {
            Recommendation::Nurse => &self.follow_up_nurse,
            Recommendation::Gp => &self.follow_up_gp,
            Recommendation::Emergency => &self.follow_up_emergency,
        };
        template.replace(SYMPTOM_PLACEHOLDER, &symptom.phrase)
    }
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
///
/// "low-grade fever" becomes "Low-Grade Fever".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{DurationClass, Severity};

    fn detection(phrase: &str, severity: Severity, recommendation: Recommendation) -> DetectedSymptom {
        DetectedSymptom {
            phrase: phrase.to_string(),
            severity,
            recommendation,
            category: "general".to_string(),
            duration: DurationClass::Unknown,
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("chest pain"), "Chest Pain");
        assert_eq!(title_case("low-grade fever"), "Low-Grade Fever");
        assert_eq!(title_case("what's up"), "What'S Up");
        assert_eq!(title_case("moderate"), "Moderate");
    }

    #[test]
    fn test_emergency_lists_all_matches() {
        let catalog = ResponseCatalog::default();
        let text = catalog.emergency(&["chest pain", "severe headache"]);

        assert_eq!(
            text,
            "EMERGENCY DETECTED: chest pain, severe headache. Please call 911 or go to the ER immediately."
        );
    }

    #[test]
    fn test_symptom_report_layout() {
        let catalog = ResponseCatalog::default();
        let mut cough = detection("cough", Severity::Low, Recommendation::Nurse);
        cough.duration = DurationClass::Chronic;
        let fever = detection("low-grade fever", Severity::Low, Recommendation::Nurse);

        let report = catalog.symptom_report(&[cough, fever]);
        assert_eq!(
            report,
            "Symptom(s) detected:\n\
             Cough (Severity: Low, Duration: chronic)\n\
             Low-Grade Fever (Severity: Low, Duration: unknown)\n\
             Please consider consulting a healthcare provider."
        );
    }

    #[test]
    fn test_follow_up_by_recommendation() {
        let catalog = ResponseCatalog::default();

        let gp = catalog.follow_up(&detection("back pain", Severity::Moderate, Recommendation::Gp));
        assert!(gp.contains("back pain"));
        assert!(gp.contains("GP"));

        let er = catalog.follow_up(&detection("high fever", Severity::High, Recommendation::Emergency));
        assert!(er.contains("911"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let catalog: ResponseCatalog = serde_yaml::from_str("hours: \"Open 24/7.\"").unwrap();

        assert_eq!(catalog.hours, "Open 24/7.");
        assert_eq!(catalog.greeting, ResponseCatalog::default().greeting);
    }
}
