//! Query correction against the term dictionary.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::spelling::dictionary::TermDictionary;
use crate::spelling::levenshtein::damerau_distance;
use crate::spelling::suggest::CorrectionSuggestion;

/// Similarity a dictionary entry must exceed to replace a token.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.6;

/// One token that was rewritten by the corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenReplacement {
    /// Position of the token in the whitespace-split query.
    pub position: usize,
    /// The token as typed.
    pub original: String,
    /// The dictionary entry it was replaced with.
    pub replacement: String,
    /// Similarity between the two.
    pub similarity: f64,
    /// Damerau-Levenshtein distance between the two, case-insensitive.
    pub distance: usize,
}

/// Result of correcting a whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Original query.
    pub original: String,
    /// Tokens re-joined with single spaces, corrections applied.
    pub corrected: String,
    /// Tokens that were actually replaced.
    pub replacements: Vec<TokenReplacement>,
}

impl CorrectionResult {
    /// Whether at least one token was replaced.
    ///
    /// Whitespace normalization alone does not count as a correction.
    pub fn has_correction(&self) -> bool {
        !self.replacements.is_empty()
    }

    /// The corrected query, or `None` when nothing was replaced.
    pub fn corrected_query(&self) -> Option<&str> {
        self.has_correction().then_some(self.corrected.as_str())
    }

    /// The query text searches should run with.
    pub fn effective_query(&self) -> &str {
        if self.has_correction() {
            &self.corrected
        } else {
            self.original.trim()
        }
    }

    /// The correction as a "did you mean" suggestion.
    pub fn suggestion(&self) -> Option<CorrectionSuggestion> {
        self.corrected_query().map(CorrectionSuggestion::client)
    }
}

/// Snaps noisy query tokens to known dictionary terms.
///
/// Holds only shared immutable state, so one corrector serves any number of
/// concurrent searches.
#[derive(Debug, Clone)]
pub struct QueryCorrector {
    dictionary: Arc<TermDictionary>,
    acceptance_threshold: f64,
}

impl QueryCorrector {
    /// Create a corrector over the given dictionary with the default
    /// acceptance threshold.
    pub fn new(dictionary: Arc<TermDictionary>) -> Self {
        QueryCorrector {
            dictionary,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }

    /// Set the similarity a candidate must exceed to be accepted.
    pub fn with_acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    /// Get the dictionary.
    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// Get the acceptance threshold.
    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    /// Correct a single token.
    ///
    /// Known terms come back unchanged (as typed, not re-cased). Otherwise
    /// the closest entry is returned if its similarity exceeds the
    /// acceptance threshold, else the token itself.
    pub fn correct_token(&self, word: &str) -> String {
        self.replacement_for(word)
            .map(|(term, _)| term.to_string())
            .unwrap_or_else(|| word.to_string())
    }

    /// Correct every whitespace-separated token and re-join with single
    /// spaces.
    pub fn correct_query(&self, text: &str) -> CorrectionResult {
        let mut tokens = Vec::new();
        let mut replacements = Vec::new();

        for (position, token) in text.split_whitespace().enumerate() {
            match self.replacement_for(token) {
                Some((term, score)) => {
                    replacements.push(TokenReplacement {
                        position,
                        original: token.to_string(),
                        replacement: term.to_string(),
                        similarity: score,
                        distance: damerau_distance(&token.to_lowercase(), &term.to_lowercase()),
                    });
                    tokens.push(term.to_string());
                }
                None => tokens.push(token.to_string()),
            }
        }

        CorrectionResult {
            original: text.to_string(),
            corrected: tokens.join(" "),
            replacements,
        }
    }

    fn replacement_for(&self, word: &str) -> Option<(&str, f64)> {
        if word.is_empty() || self.dictionary.contains(word) {
            return None;
        }
        self.dictionary
            .closest(word)
            .filter(|(_, score)| *score > self.acceptance_threshold)
    }
}

impl Default for QueryCorrector {
    fn default() -> Self {
        Self::new(Arc::new(TermDictionary::builtin()))
    }
}
