//! Latency benchmarks for the classification cascade
//!
//! Every message is a fixed number of scans over small tables, so a call
//! should stay well under a millisecond regardless of which branch answers.
//!
//! Run with: cargo bench -p triage-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use triage_engine::{InMemorySessionStore, MessageClassifier, PhraseMatcher, RuleSet};

/// Benchmark one message per cascade branch
fn benchmark_cascade_branches(c: &mut Criterion) {
    let classifier = MessageClassifier::new(
        Arc::new(RuleSet::builtin().expect("Failed to compile built-in rules")),
        Arc::new(InMemorySessionStore::new()),
    );

    let test_cases = vec![
        ("greeting", "Good morning!"),
        ("follow_up", "What should I do next?"),
        ("emergency", "Sudden severe headache and chest pain"),
        ("symptoms", "I have had a persistent cough and a runny nose for weeks"),
        ("intent", "Can I book an appointment for Tuesday?"),
        ("default", "Tell me about the weather today"),
    ];

    let mut group = c.benchmark_group("Cascade");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("respond", name), &text, |b, text| {
            b.iter(|| {
                // Fresh session each iteration keeps history from growing
                let reply = classifier.respond(black_box(text), "bench");
                classifier.clear_session("bench");
                reply
            });
        });
    }

    group.finish();
}

/// Benchmark raw phrase matching against the symptom table
fn benchmark_symptom_matcher(c: &mut Criterion) {
    let matcher = PhraseMatcher::new(
        triage_engine::tables::SYMPTOMS
            .iter()
            .map(|(phrase, _, _, _)| *phrase),
    )
    .expect("Failed to build symptom matcher");

    let short = "mild headache";
    let long = "For the last few weeks I have had joint pain, muscle aches, fatigue, \
                a low-grade fever in the evenings and some dizziness when standing up";

    let mut group = c.benchmark_group("SymptomMatcher");
    group.bench_function("short", |b| {
        b.iter(|| matcher.matched_indices(black_box(short)))
    });
    group.bench_function("long", |b| {
        b.iter(|| matcher.matched_indices(black_box(long)))
    });
    group.finish();
}

criterion_group!(benches, benchmark_cascade_branches, benchmark_symptom_matcher);
criterion_main!(benches);
