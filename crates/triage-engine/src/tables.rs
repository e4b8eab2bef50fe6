//! Built-in rule tables
//!
//! Every table is an ordered slice. Order is semantic: modifier resolution
//! takes the first entry whose keyword is contained in the message, and
//! emergency/symptom responses list matches in table order.

use triage_core::{DurationClass, Recommendation, Severity};

use Recommendation::{Emergency, Gp, Nurse};
use Severity::{High, Low, Moderate};

/// (phrase, base severity, recommendation, category)
pub const SYMPTOMS: &[(&str, Severity, Recommendation, &str)] = &[
    ("chest pain", High, Emergency, "cardiovascular"),
    ("shortness of breath", High, Emergency, "respiratory"),
    ("severe headache", High, Emergency, "neurological"),
    ("headache", Low, Nurse, "neurological"),
    ("cough", Low, Nurse, "respiratory"),
    ("nausea", Low, Nurse, "gastrointestinal"),
    ("vomiting", Moderate, Gp, "gastrointestinal"),
    ("abdominal pain", Moderate, Gp, "gastrointestinal"),
    ("stomach pain", Moderate, Gp, "gastrointestinal"),
    ("severe abdominal pain", High, Emergency, "gastrointestinal"),
    ("back pain", Moderate, Gp, "musculoskeletal"),
    ("severe back pain", High, Emergency, "musculoskeletal"),
    ("dizziness", Moderate, Gp, "neurological"),
    ("fatigue", Low, Nurse, "general"),
    ("fever", Moderate, Gp, "general"),
    ("high fever", High, Emergency, "general"),
    ("low-grade fever", Low, Nurse, "general"),
    ("rash", Low, Nurse, "dermatological"),
    ("sore throat", Low, Nurse, "respiratory"),
    ("runny nose", Low, Nurse, "respiratory"),
    ("diarrhea", Moderate, Gp, "gastrointestinal"),
    ("constipation", Low, Nurse, "gastrointestinal"),
    ("blurred vision", Moderate, Gp, "neurological"),
    ("palpitations", Moderate, Gp, "cardiovascular"),
    ("joint pain", Moderate, Gp, "musculoskeletal"),
    ("muscle aches", Low, Nurse, "musculoskeletal"),
    ("swollen ankles", Moderate, Gp, "cardiovascular"),
    ("frequent urination", Moderate, Gp, "genitourinary"),
    ("painful urination", Moderate, Gp, "genitourinary"),
    ("menstrual cramps", Low, Nurse, "reproductive"),
    ("breast pain", Low, Nurse, "reproductive"),
];

pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "shortness of breath",
    "severe headache",
    "sudden severe headache",
    "unconscious",
    "bleeding heavily",
    "heavy bleeding",
    "severe bleeding",
    "heart attack",
    "stroke",
    "severe allergic reaction",
    "loss of consciousness",
    "seizure",
    "confusion",
    "vomiting blood",
    "coughing up blood",
    "bloody stool",
    "severe abdominal pain",
    "high fever",
    "allergic reaction",
    "vision problems",
    "severe back pain",
];

pub const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
    "howdy",
    "what's up",
];

pub const FOLLOW_UP_PHRASES: &[&str] = &[
    "what should i do",
    "how long",
    "when should i",
    "is this normal",
    "should i be worried",
    "how serious",
    "next steps",
    "what if",
];

pub const SEVERITY_MODIFIERS: &[(&str, Severity)] = &[
    ("severe", High),
    ("extreme", High),
    ("intense", High),
    ("unbearable", High),
    ("mild", Low),
    ("slight", Low),
    ("minor", Low),
];

pub const DURATION_KEYWORDS: &[(&str, DurationClass)] = &[
    ("sudden", DurationClass::Acute),
    ("suddenly", DurationClass::Acute),
    ("immediate", DurationClass::Acute),
    ("chronic", DurationClass::Chronic),
    ("ongoing", DurationClass::Chronic),
    ("persistent", DurationClass::Chronic),
    ("continuous", DurationClass::Chronic),
    ("weeks", DurationClass::Chronic),
    ("months", DurationClass::Chronic),
];

pub const APPOINTMENT_KEYWORDS: &[&str] = &["appointment", "book", "schedule"];

pub const HOURS_KEYWORDS: &[&str] = &["hours", "open", "when are you open"];

pub const MEDICATION_KEYWORDS: &[&str] = &["medication", "drug", "pill"];

pub const INSURANCE_KEYWORDS: &[&str] = &["insurance", "copay", "coverage"];
