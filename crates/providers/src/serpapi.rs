//! Web search gateway backed by SerpAPI.
//!
//! Issues one `GET search.json?q=...&engine=google` per query and returns the
//! organic results in ranking order. Results keep whatever fields SerpAPI
//! sent; missing snippets are left as `None` for the caller to skip.

use async_trait::async_trait;
use penwright_core::error::ProviderError;
use penwright_core::gateway::{SearchGateway, SearchHit};
use serde::Deserialize;
use tracing::{debug, warn};

pub struct SerpApiGateway {
    endpoint: String,
    api_key: String,
    engine: String,
    client: reqwest::Client,
}

impl SerpApiGateway {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine: engine.into(),
            client: crate::http_client()?,
        })
    }

    /// Google engine on the public SerpAPI endpoint.
    pub fn google(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new("https://serpapi.com/search.json", api_key, "google")
    }
}

fn parse_hits(body: SearchResponse) -> Result<Vec<SearchHit>, ProviderError> {
    if let Some(error) = body.error {
        return Err(ProviderError::ApiError {
            status_code: 200,
            message: error,
        });
    }

    Ok(body
        .organic_results
        .into_iter()
        .map(|r| SearchHit {
            title: r.title,
            link: r.link,
            snippet: r.snippet,
        })
        .collect())
}

#[async_trait]
impl SearchGateway for SerpApiGateway {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn query(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        debug!(engine = %self.engine, query, "Sending search request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("engine", self.engine.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Search provider returned error");
            return Err(crate::openai_compat::status_error(status, error_body));
        }

        let body: SearchResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse search response: {e}"),
        })?;

        let hits = parse_hits(body)?;
        debug!(count = hits.len(), "Search returned hits");
        Ok(hits)
    }
}

// --- SerpAPI response types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use penwright_core::gateway::join_snippets;

    #[test]
    fn google_constructor() {
        let gateway = SerpApiGateway::google("serp-test").unwrap();
        assert_eq!(gateway.name(), "serpapi");
        assert_eq!(gateway.engine, "google");
        assert!(gateway.endpoint.contains("serpapi.com"));
    }

    #[test]
    fn parse_organic_results_keeps_order_and_gaps() {
        let data = r#"{
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "Rust", "link": "https://rust-lang.org", "snippet": "A language"},
                {"position": 2, "title": "No snippet here", "link": "https://example.com"},
                {"position": 3, "title": "Crates", "snippet": "Packages"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(data).unwrap();
        let hits = parse_hits(parsed).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title.as_deref(), Some("Rust"));
        assert!(hits[1].snippet.is_none());
        assert_eq!(join_snippets(&hits), "A language\n\nPackages");
    }

    #[test]
    fn missing_organic_results_is_empty() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"search_metadata": {}}"#).unwrap();
        assert!(parse_hits(parsed).unwrap().is_empty());
    }

    #[test]
    fn error_field_becomes_api_error() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"error": "Invalid API key."}"#).unwrap();
        let err = parse_hits(parsed).unwrap_err();
        assert!(err.to_string().contains("Invalid API key."));
    }
}
