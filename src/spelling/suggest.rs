//! Correction and autocomplete suggestions surfaced alongside results.

use serde::{Deserialize, Serialize};

/// Where a correction suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Derived locally from the term dictionary.
    Client,
    /// Returned by one of the backend's suggesters.
    Backend,
}

/// A candidate replacement for the whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSuggestion {
    /// The suggested query text.
    pub text: String,
    /// Provenance of the suggestion.
    pub source: SuggestionSource,
}

impl CorrectionSuggestion {
    /// Suggestion produced from the local dictionary.
    pub fn client<S: Into<String>>(text: S) -> Self {
        CorrectionSuggestion {
            text: text.into(),
            source: SuggestionSource::Client,
        }
    }

    /// Suggestion produced by a backend suggester.
    pub fn backend<S: Into<String>>(text: S) -> Self {
        CorrectionSuggestion {
            text: text.into(),
            source: SuggestionSource::Backend,
        }
    }
}

/// Spelling corrections and autocomplete completions for one query.
///
/// Both lists keep insertion order and drop case-insensitive duplicates, so
/// callers can take the first `n` entries as the best ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSet {
    /// Whole-query spelling corrections.
    pub spelling: Vec<CorrectionSuggestion>,
    /// Prefix completions.
    pub autocomplete: Vec<String>,
}

impl SuggestionSet {
    /// Create an empty suggestion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spelling suggestion unless an equivalent one is already present.
    pub fn push_spelling(&mut self, suggestion: CorrectionSuggestion) {
        let text = suggestion.text.trim();
        if text.is_empty() {
            return;
        }
        let lowered = text.to_lowercase();
        let duplicate = self
            .spelling
            .iter()
            .any(|s| s.text.to_lowercase() == lowered);
        if !duplicate {
            self.spelling.push(suggestion);
        }
    }

    /// Add an autocomplete completion unless already present.
    pub fn push_autocomplete<S: Into<String>>(&mut self, completion: S) {
        let completion = completion.into();
        if completion.trim().is_empty() {
            return;
        }
        let lowered = completion.to_lowercase();
        if !self.autocomplete.iter().any(|c| c.to_lowercase() == lowered) {
            self.autocomplete.push(completion);
        }
    }

    /// Whether any backend suggestion has been collected.
    pub fn has_backend_spelling(&self) -> bool {
        self.spelling
            .iter()
            .any(|s| s.source == SuggestionSource::Backend)
    }

    /// Spelling suggestion texts in order.
    pub fn spelling_texts(&self) -> Vec<&str> {
        self.spelling.iter().map(|s| s.text.as_str()).collect()
    }

    /// Keep at most `max` entries in each list.
    pub fn truncate(&mut self, max: usize) {
        self.spelling.truncate(max);
        self.autocomplete.truncate(max);
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.spelling.is_empty() && self.autocomplete.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_is_case_insensitive() {
        let mut set = SuggestionSet::new();
        set.push_spelling(CorrectionSuggestion::backend("OpenAI model"));
        set.push_spelling(CorrectionSuggestion::client("openai MODEL"));
        set.push_spelling(CorrectionSuggestion::client("  "));
        assert_eq!(set.spelling.len(), 1);
        assert_eq!(set.spelling[0].source, SuggestionSource::Backend);
        assert!(set.has_backend_spelling());

        set.push_autocomplete("Nvidia earnings");
        set.push_autocomplete("nvidia earnings");
        assert_eq!(set.autocomplete, vec!["Nvidia earnings".to_string()]);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let json = serde_json::to_string(&CorrectionSuggestion::client("ai")).unwrap();
        assert_eq!(json, r#"{"text":"ai","source":"client"}"#);
    }

    #[test]
    fn test_truncate() {
        let mut set = SuggestionSet::new();
        for s in ["a1", "a2", "a3"] {
            set.push_autocomplete(s);
            set.push_spelling(CorrectionSuggestion::client(s));
        }
        set.truncate(2);
        assert_eq!(set.spelling_texts(), vec!["a1", "a2"]);
        assert_eq!(set.autocomplete.len(), 2);
    }
}
