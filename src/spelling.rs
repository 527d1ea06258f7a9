//! Spelling correction for search queries.
//!
//! This module powers typo tolerance across the search pipeline: pure edit
//! distance and similarity functions, the curated term dictionary that noisy
//! tokens are snapped to, the query corrector built on top of both, and the
//! suggestion types surfaced to callers as "did you mean" prompts.

pub mod corrector;
pub mod dictionary;
pub mod levenshtein;
pub mod suggest;

pub use corrector::{CorrectionResult, QueryCorrector, TokenReplacement};
pub use dictionary::TermDictionary;
pub use levenshtein::{damerau_distance, edit_distance, edit_distance_within, similarity};
pub use suggest::{CorrectionSuggestion, SuggestionSet, SuggestionSource};
