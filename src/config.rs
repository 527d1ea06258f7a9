//! Configuration loading and validation.
//!
//! Configuration is a single JSON document. Every section and field is
//! optional and falls back to its default, so an empty object is a valid
//! local-only configuration.
//!
//! # Examples
//!
//! ```
//! use newsfind::config::NewsfindConfig;
//!
//! let config: NewsfindConfig = serde_json::from_str(
//!     r#"{
//!         "backend": { "url": "http://localhost:9200", "index": "news" },
//!         "search": { "min_primary_hits": 5 }
//!     }"#,
//! )
//! .unwrap();
//! config.validate().unwrap();
//!
//! assert_eq!(config.search.thresholds.min_primary_hits, 5);
//! assert_eq!(config.search.thresholds.min_combined_hits, 5);
//! assert_eq!(config.backend.timeout_ms, 3000);
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::elasticsearch::ElasticsearchBackend;
use crate::backend::keyword::KeywordApiClient;
use crate::error::{NewsfindError, Result};
use crate::query::planner::{PlannerConfig, QueryPlanner};
use crate::search::matcher::MatcherConfig;
use crate::search::orchestrator::{SearchOrchestrator, SearchSettings};
use crate::spelling::corrector::{DEFAULT_ACCEPTANCE_THRESHOLD, QueryCorrector};
use crate::spelling::dictionary::TermDictionary;

/// Primary search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base url of the search server; no primary tier when absent.
    pub url: Option<String>,
    /// Name of the article index.
    pub index: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: None,
            index: "news".to_string(),
            timeout_ms: 3000,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Secondary keyword endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    /// Url of the keyword endpoint; no secondary tier when absent.
    pub url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        SecondaryConfig {
            url: None,
            timeout_ms: 5000,
        }
    }
}

impl SecondaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Term dictionary used for query correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Similarity a dictionary entry must exceed to replace a word.
    pub acceptance_threshold: f64,
    /// Terms added to the built-in vocabulary.
    pub extra_terms: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        DictionaryConfig {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            extra_terms: Vec::new(),
        }
    }
}

impl DictionaryConfig {
    /// The built-in dictionary extended with `extra_terms`.
    pub fn build(&self) -> TermDictionary {
        let mut dictionary = TermDictionary::builtin();
        dictionary.extend(&self.extra_terms);
        dictionary
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsfindConfig {
    pub backend: BackendConfig,
    pub secondary: SecondaryConfig,
    pub search: SearchSettings,
    pub matcher: MatcherConfig,
    pub dictionary: DictionaryConfig,
    pub planner: PlannerConfig,
}

impl NewsfindConfig {
    /// Read, parse and validate a JSON configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: NewsfindConfig = serde_json::from_str(&text).map_err(|e| {
            NewsfindError::invalid_config(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_ms == 0 || self.secondary.timeout_ms == 0 {
            return Err(NewsfindError::invalid_config("timeouts must be positive"));
        }
        if self.backend.url.is_some() && self.backend.index.trim().is_empty() {
            return Err(NewsfindError::invalid_config("backend.index is empty"));
        }
        if self.search.default_size == 0 {
            return Err(NewsfindError::invalid_config(
                "search.default_size must be positive",
            ));
        }
        if self.search.min_query_chars == 0 {
            return Err(NewsfindError::invalid_config(
                "search.min_query_chars must be positive",
            ));
        }
        if !self.matcher.threshold.is_finite() || self.matcher.threshold < 0.0 {
            return Err(NewsfindError::invalid_config(format!(
                "matcher.threshold must be a non-negative number, got {}",
                self.matcher.threshold
            )));
        }
        if self.matcher.max_results == 0 {
            return Err(NewsfindError::invalid_config(
                "matcher.max_results must be positive",
            ));
        }
        let acceptance = self.dictionary.acceptance_threshold;
        if !(0.0..1.0).contains(&acceptance) {
            return Err(NewsfindError::invalid_config(format!(
                "dictionary.acceptance_threshold must be in [0, 1), got {acceptance}"
            )));
        }
        let planner = &self.planner;
        let boosts = [
            planner.phrase_boost,
            planner.best_fields_boost,
            planner.fuzzy_boost,
            planner.wildcard_boost,
        ];
        if boosts.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(NewsfindError::invalid_config(
                "planner boosts must be positive",
            ));
        }
        if planner.phrase_fields.is_empty() || planner.best_fields.is_empty() {
            return Err(NewsfindError::invalid_config(
                "planner phrase and best-fields lists must not be empty",
            ));
        }
        Ok(())
    }

    /// Wire up an orchestrator with every tier this configuration enables.
    pub fn build_orchestrator(&self) -> Result<SearchOrchestrator> {
        let corrector = QueryCorrector::new(Arc::new(self.dictionary.build()))
            .with_acceptance_threshold(self.dictionary.acceptance_threshold);
        let planner = QueryPlanner::new(Arc::new(self.planner.clone()));

        let mut orchestrator = SearchOrchestrator::new(Arc::new(corrector), self.matcher.clone())
            .with_planner(planner)
            .with_settings(self.search.clone());

        if let Some(url) = &self.backend.url {
            let backend =
                ElasticsearchBackend::new(url, &self.backend.index, self.backend.timeout())?;
            orchestrator = orchestrator.with_primary(Arc::new(backend), self.backend.timeout());
        }
        if let Some(url) = &self.secondary.url {
            let client = KeywordApiClient::new(url, self.secondary.timeout())?;
            orchestrator = orchestrator.with_secondary(Arc::new(client), self.secondary.timeout());
        }

        Ok(orchestrator)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = NewsfindConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend.url, None);
        assert_eq!(config.backend.timeout(), Duration::from_secs(3));
        assert_eq!(config.secondary.timeout(), Duration::from_secs(5));
        assert_eq!(config.search.default_size, 10);
        assert_eq!(config.search.min_query_chars, 2);
        assert_eq!(config.matcher.threshold, 0.3);
        assert_eq!(config.matcher.max_results, 20);
        assert_eq!(config.dictionary.acceptance_threshold, 0.6);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "backend": {{ "url": "http://localhost:9200", "timeout_ms": 1500 }},
                "search": {{ "default_size": 20, "min_combined_hits": 8 }},
                "dictionary": {{ "extra_terms": ["Anduril"] }}
            }}"#
        )
        .unwrap();

        let config = NewsfindConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.backend.url.as_deref(), Some("http://localhost:9200"));
        assert_eq!(config.backend.index, "news");
        assert_eq!(config.backend.timeout(), Duration::from_millis(1500));
        assert_eq!(config.search.default_size, 20);
        assert_eq!(config.search.thresholds.min_primary_hits, 3);
        assert_eq!(config.search.thresholds.min_combined_hits, 8);
        assert!(config.dictionary.build().contains("anduril"));
        assert!(config.build_orchestrator().is_ok());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            NewsfindConfig::load_from_file("/definitely/not/here.json"),
            Err(NewsfindError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            NewsfindConfig::load_from_file(file.path()),
            Err(NewsfindError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NewsfindConfig::default();
        config.dictionary.acceptance_threshold = 1.0;
        assert!(config.validate().is_err());

        let mut config = NewsfindConfig::default();
        config.search.default_size = 0;
        assert!(config.validate().is_err());

        let mut config = NewsfindConfig::default();
        config.planner.fuzzy_boost = -1.0;
        assert!(config.validate().is_err());

        let mut config = NewsfindConfig::default();
        config.backend.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_backend_url_fails_to_build() {
        let mut config = NewsfindConfig::default();
        config.backend.url = Some("::not a url::".to_string());
        assert!(config.build_orchestrator().is_err());
    }
}
