//! Suggester requests sent alongside a search: per-word correction, whole
//! phrase correction and prefix completion.

use serde_json::{Map, Value, json};

/// Name of the term suggester in requests and responses.
pub const TERM_SUGGESTER: &str = "spelling_term";
/// Name of the phrase suggester in requests and responses.
pub const PHRASE_SUGGESTER: &str = "spelling_phrase";
/// Name of the completion suggester in requests and responses.
pub const COMPLETION_SUGGESTER: &str = "autocomplete";

/// Suggesters propose alternatives for every term, known or not.
const SUGGEST_MODE: &str = "always";

/// Per-word correction against an indexed vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TermSuggester {
    pub field: String,
    pub max_edits: u8,
    pub size: usize,
}

impl TermSuggester {
    /// Always-suggest, up to two edits, against `field`.
    pub fn new<S: Into<String>>(field: S) -> Self {
        TermSuggester {
            field: field.into(),
            max_edits: 2,
            size: 3,
        }
    }

    fn to_dsl(&self) -> Value {
        json!({
            "term": {
                "field": self.field,
                "suggest_mode": SUGGEST_MODE,
                "max_edits": self.max_edits,
                "size": self.size,
            }
        })
    }
}

/// Multi-word correction that can fix and reorder whole phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseSuggester {
    /// Shingled field the phrase model is built from.
    pub field: String,
    /// Plain field candidate terms are generated from.
    pub generator_field: String,
    pub size: usize,
    pub gram_size: usize,
    pub max_errors: f32,
}

impl PhraseSuggester {
    /// Phrase suggester over a shingled field, generating candidates from
    /// `generator_field`.
    pub fn new<F: Into<String>, G: Into<String>>(field: F, generator_field: G) -> Self {
        PhraseSuggester {
            field: field.into(),
            generator_field: generator_field.into(),
            size: 3,
            gram_size: 3,
            max_errors: 2.0,
        }
    }

    fn to_dsl(&self) -> Value {
        json!({
            "phrase": {
                "field": self.field,
                "size": self.size,
                "gram_size": self.gram_size,
                "max_errors": self.max_errors,
                "direct_generator": [{
                    "field": self.generator_field,
                    "suggest_mode": SUGGEST_MODE,
                }],
                "highlight": { "pre_tag": "<em>", "post_tag": "</em>" },
            }
        })
    }
}

/// Prefix autocomplete against a completion field.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSuggester {
    pub field: String,
    pub size: usize,
    pub skip_duplicates: bool,
    /// Allow this many edits in the typed prefix; `None` disables fuzziness.
    pub fuzzy_edits: Option<u8>,
}

impl CompletionSuggester {
    /// Completion over `field` with duplicate skipping.
    pub fn new<S: Into<String>>(field: S) -> Self {
        CompletionSuggester {
            field: field.into(),
            size: 5,
            skip_duplicates: true,
            fuzzy_edits: Some(1),
        }
    }

    fn to_dsl(&self, prefix: &str) -> Value {
        let mut completion = json!({
            "field": self.field,
            "size": self.size,
            "skip_duplicates": self.skip_duplicates,
        });
        if let Some(edits) = self.fuzzy_edits {
            completion["fuzzy"] = json!({ "fuzziness": edits });
        }
        json!({ "prefix": prefix, "completion": completion })
    }
}

/// The set of suggesters attached to one search request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestRequest {
    pub text: String,
    pub term: Option<TermSuggester>,
    pub phrase: Option<PhraseSuggester>,
    pub completion: Option<CompletionSuggester>,
}

impl SuggestRequest {
    /// An empty request for `text`.
    pub fn new<S: Into<String>>(text: S) -> Self {
        SuggestRequest {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a term suggester.
    pub fn with_term(mut self, term: TermSuggester) -> Self {
        self.term = Some(term);
        self
    }

    /// Add a phrase suggester.
    pub fn with_phrase(mut self, phrase: PhraseSuggester) -> Self {
        self.phrase = Some(phrase);
        self
    }

    /// Add a completion suggester.
    pub fn with_completion(mut self, completion: CompletionSuggester) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Whether no suggester is configured.
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.phrase.is_none() && self.completion.is_none()
    }

    /// Render the `suggest` section of a search body.
    pub fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        body.insert("text".to_string(), json!(self.text));
        if let Some(term) = &self.term {
            body.insert(TERM_SUGGESTER.to_string(), term.to_dsl());
        }
        if let Some(phrase) = &self.phrase {
            body.insert(PHRASE_SUGGESTER.to_string(), phrase.to_dsl());
        }
        if let Some(completion) = &self.completion {
            body.insert(COMPLETION_SUGGESTER.to_string(), completion.to_dsl(&self.text));
        }
        Value::Object(body)
    }
}
