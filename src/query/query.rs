//! Base query trait and the field helpers shared by every clause type.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::mapper::IndexDocument;

/// A clause of a structured search query.
///
/// Every clause renders itself into the backend's JSON query DSL and can
/// also be evaluated in-process against an [`IndexDocument`], which is how
/// the in-memory backend answers the same structured query without a
/// search server.
pub trait Query: Send + Sync + Debug {
    /// Render this clause as backend query DSL.
    fn to_dsl(&self) -> Value;

    /// Score a document against this clause. `None` means no match.
    fn score(&self, doc: &IndexDocument) -> Option<f32>;

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A field name with a relative weight, rendered as `name^weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub name: String,
    pub weight: f32,
}

impl FieldBoost {
    /// A field with weight 1.
    pub fn new<S: Into<String>>(name: S) -> Self {
        FieldBoost {
            name: name.into(),
            weight: 1.0,
        }
    }

    /// A field with an explicit weight.
    pub fn weighted<S: Into<String>>(name: S, weight: f32) -> Self {
        FieldBoost {
            name: name.into(),
            weight,
        }
    }
}

impl Display for FieldBoost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.weight - 1.0).abs() < f32::EPSILON {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}^{}", self.name, self.weight)
        }
    }
}

/// Render a field list the way the DSL expects it.
pub(crate) fn fields_dsl(fields: &[FieldBoost]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|f| Value::String(f.to_string()))
            .collect(),
    )
}

/// The values stored under `field` in an index document.
///
/// Sub-fields such as `title.keyword` resolve to their parent field.
pub(crate) fn field_values<'a>(doc: &'a IndexDocument, field: &str) -> Vec<&'a str> {
    let base = field.split('.').next().unwrap_or(field);
    match base {
        "id" => vec![doc.id.as_str()],
        "title" => vec![doc.title.as_str()],
        "description" => vec![doc.description.as_str()],
        "content" => vec![doc.content.as_str()],
        "category" => vec![doc.category.as_str()],
        "source" => vec![doc.source.as_str()],
        "sourceUrl" => vec![doc.source_url.as_str()],
        "tags" => doc.tags.iter().map(String::as_str).collect(),
        "suggest" => doc.suggest.input.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Lowercase word tokens of a text, split on anything that is not a letter
/// or digit.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::article::Article;
    use crate::document::mapper::to_index_document;

    #[test]
    fn test_field_boost_display() {
        assert_eq!(FieldBoost::new("content").to_string(), "content");
        assert_eq!(FieldBoost::weighted("title", 3.0).to_string(), "title^3");
        assert_eq!(FieldBoost::weighted("tags", 1.5).to_string(), "tags^1.5");
    }

    #[test]
    fn test_field_values() {
        let doc = to_index_document(
            &Article::new("1", "Title")
                .with_tags(["a", "b"])
                .with_source_url("https://x"),
        )
        .unwrap();
        assert_eq!(field_values(&doc, "title.keyword"), vec!["Title"]);
        assert_eq!(field_values(&doc, "tags"), vec!["a", "b"]);
        assert_eq!(field_values(&doc, "sourceUrl"), vec!["https://x"]);
        assert!(field_values(&doc, "nope").is_empty());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("OpenAI's GPT-5, 人工智能!"),
            vec!["openai", "s", "gpt", "5", "人工智能"]
        );
    }
}
