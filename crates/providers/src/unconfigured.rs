//! Placeholder for a gateway whose credentials are missing.

use async_trait::async_trait;
use penwright_core::error::ProviderError;
use penwright_core::gateway::{GenerationGateway, SearchGateway, SearchHit};

/// Fails every call with the error that prevented the real gateway from
/// being built. Lets the rest of the tools work when only one service is
/// configured.
pub struct Unconfigured {
    error: ProviderError,
}

impl Unconfigured {
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl GenerationGateway for Unconfigured {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, ProviderError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl SearchGateway for Unconfigured {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn query(&self, _query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        Err(self.error.clone())
    }
}
