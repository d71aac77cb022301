//! External service gateways for Penwright.
//!
//! All generation backends implement `penwright_core::GenerationGateway`
//! and all search backends implement `penwright_core::SearchGateway`.
//! [`build_generation`] and [`build_search`] pick the concrete adapter from
//! configuration.

pub mod openai_compat;
pub mod serpapi;
pub mod unconfigured;

pub use openai_compat::OpenAiCompatGateway;
pub use serpapi::SerpApiGateway;
pub use unconfigured::Unconfigured;

use penwright_config::AppConfig;
use penwright_core::error::ProviderError;
use std::time::Duration;

/// Shared HTTP client settings. Only connection setup is bounded; a request
/// that has connected waits for the provider as long as it takes.
pub(crate) fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {e}")))
}

/// Build the generation gateway from config.
pub fn build_generation(config: &AppConfig) -> Result<OpenAiCompatGateway, ProviderError> {
    let api_key = config.generation.api_key.as_deref().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no AI provider credential (set OPENAI_API_KEY or generation.api_key)".into(),
        )
    })?;

    OpenAiCompatGateway::new(
        "openai",
        &config.generation.api_url,
        api_key,
        &config.generation.model,
    )
}

/// Build the search gateway from config.
pub fn build_search(config: &AppConfig) -> Result<SerpApiGateway, ProviderError> {
    let api_key = config.search.api_key.as_deref().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no search provider credential (set SERPAPI_API_KEY or search.api_key)".into(),
        )
    })?;

    SerpApiGateway::new(&config.search.api_url, api_key, &config.search.engine)
}
