//! Phrase matcher over ordered rule tables

use aho_corasick::{AhoCorasick, MatchKind};
use triage_core::{Error, Result};

/// Substring matcher for one ordered phrase table, built on Aho-Corasick.
///
/// Matching is plain containment: no tokenization and no word boundaries, so
/// "feverish" contains "fever" and "this" contains "hi". Results are always
/// reported in table order, never in the order phrases occur in the text.
pub struct PhraseMatcher {
    automaton: AhoCorasick,
    phrases: Vec<String>,
}

impl PhraseMatcher {
    /// Create a matcher for the given phrases, preserving their order
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();

        if let Some(position) = phrases.iter().position(|p| p.is_empty()) {
            return Err(Error::rules(format!("empty phrase at position {}", position)));
        }

        // Standard semantics are required for overlapping iteration.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(true)
            .build(&phrases)
            .map_err(|e| Error::rules(format!("Failed to build phrase matcher: {}", e)))?;

        Ok(Self { automaton, phrases })
    }

    /// Whether any phrase is contained in the text
    pub fn is_match(&self, text: &str) -> bool {
        !self.phrases.is_empty() && self.automaton.is_match(text)
    }

    /// Table indices of every contained phrase, ascending and deduplicated
    pub fn matched_indices(&self, text: &str) -> Vec<usize> {
        if self.phrases.is_empty() {
            return Vec::new();
        }

        let mut seen = vec![false; self.phrases.len()];
        for m in self.automaton.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }

        seen.iter()
            .enumerate()
            .filter_map(|(index, hit)| hit.then_some(index))
            .collect()
    }

    /// Table index of the first contained phrase in table order
    pub fn first_match(&self, text: &str) -> Option<usize> {
        if self.phrases.is_empty() {
            return None;
        }

        self.automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min()
    }

    /// Every contained phrase, in table order
    pub fn matched_phrases(&self, text: &str) -> Vec<&str> {
        self.matched_indices(text)
            .into_iter()
            .map(|index| self.phrases[index].as_str())
            .collect()
    }

    /// Number of phrases in the table
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl std::fmt::Debug for PhraseMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseMatcher")
            .field("phrases", &self.phrases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_containment() {
        let matcher = PhraseMatcher::new(["fever", "cough"]).unwrap();

        assert!(matcher.is_match("i feel feverish"));
        assert!(matcher.is_match("COUGHING all night"));
        assert!(!matcher.is_match("all good"));
    }

    #[test]
    fn test_overlapping_matches_in_table_order() {
        let matcher =
            PhraseMatcher::new(["severe headache", "headache", "sudden severe headache"]).unwrap();

        let phrases = matcher.matched_phrases("a sudden severe headache");
        assert_eq!(phrases, vec!["severe headache", "headache", "sudden severe headache"]);
    }

    #[test]
    fn test_first_match_uses_table_order() {
        // "mild" occurs first in the text but "severe" comes first in the table
        let matcher = PhraseMatcher::new(["severe", "extreme", "mild"]).unwrap();

        assert_eq!(matcher.first_match("mild then severe"), Some(0));
        assert_eq!(matcher.first_match("only mild"), Some(2));
        assert_eq!(matcher.first_match("nothing"), None);
    }

    #[test]
    fn test_repeated_phrase_reported_once() {
        let matcher = PhraseMatcher::new(["pain"]).unwrap();
        assert_eq!(matcher.matched_indices("pain, more pain"), vec![0]);
    }

    #[test]
    fn test_empty_table_never_matches() {
        let matcher = PhraseMatcher::new(Vec::<String>::new()).unwrap();

        assert!(matcher.is_empty());
        assert!(!matcher.is_match("anything"));
        assert!(matcher.matched_indices("anything").is_empty());
        assert_eq!(matcher.first_match("anything"), None);
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let err = PhraseMatcher::new(["ok", ""]).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }
}
