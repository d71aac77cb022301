//! Gateway traits: the abstraction over external AI services.
//!
//! A generation gateway turns a prompt into text; a search gateway turns a
//! query into a list of hits. Both are single request/response calls: no
//! retries, no streaming. Implementations live in `penwright-providers`.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default sampling temperature for completions.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Separator placed between snippets when a result set is flattened.
pub const SNIPPET_SEPARATOR: &str = "\n\n";

/// A single web-search result. Every field is optional; providers omit
/// whatever they do not have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchHit {
    pub fn with_snippet(snippet: impl Into<String>) -> Self {
        Self {
            snippet: Some(snippet.into()),
            ..Default::default()
        }
    }
}

/// Flatten search hits into one block of text: snippets joined by a blank
/// line, hits without a snippet skipped.
pub fn join_snippets(hits: &[SearchHit]) -> String {
    hits.iter()
        .filter_map(|hit| hit.snippet.as_deref())
        .collect::<Vec<_>>()
        .join(SNIPPET_SEPARATOR)
}

/// A hosted text-completion model.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// A human-readable name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send one prompt and return the generated text.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError>;
}

/// A hosted web-search API.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// A human-readable name (e.g., "serpapi").
    fn name(&self) -> &str;

    /// Run one query and return the hits in provider order.
    async fn query(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_hits_without_snippet() {
        let hits = vec![
            SearchHit::with_snippet("A"),
            SearchHit::default(),
            SearchHit::with_snippet("B"),
        ];
        assert_eq!(join_snippets(&hits), "A\n\nB");
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert_eq!(join_snippets(&[]), "");
        assert_eq!(join_snippets(&[SearchHit::default()]), "");
    }

    #[test]
    fn search_hit_deserializes_with_missing_fields() {
        let hit: SearchHit = serde_json::from_str(r#"{"title":"Rust"}"#).unwrap();
        assert_eq!(hit.title.as_deref(), Some("Rust"));
        assert!(hit.snippet.is_none());
    }
}
