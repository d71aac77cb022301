//! Gateway and store doubles for dispatcher tests.

use penwright_core::audit::{AuditLogStore, InteractionRecord};
use penwright_core::error::{AuditError, ProviderError};
use penwright_core::gateway::{GenerationGateway, SearchGateway, SearchHit};
use std::sync::Mutex;

/// Returns the same text for every call and remembers what it was sent.
pub struct RecordingGeneration {
    reply: String,
    calls: Mutex<Vec<(String, f32)>>,
}

impl RecordingGeneration {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl GenerationGateway for RecordingGeneration {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        Ok(self.reply.clone())
    }
}

/// Fails every call with a fixed error.
pub struct FailingGeneration {
    error: ProviderError,
}

impl FailingGeneration {
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

#[async_trait::async_trait]
impl GenerationGateway for FailingGeneration {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, ProviderError> {
        Err(self.error.clone())
    }
}

/// Returns scripted hits (or a scripted error) and records each query.
pub struct ScriptedSearch {
    result: Result<Vec<SearchHit>, ProviderError>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            result: Ok(hits),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            result: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchGateway for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted_search"
    }

    async fn query(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone()
    }
}

/// An audit store whose writes always fail.
pub struct FailingAuditStore;

#[async_trait::async_trait]
impl AuditLogStore for FailingAuditStore {
    fn name(&self) -> &str {
        "failing_store"
    }

    async fn append(&self, _record: &InteractionRecord) -> Result<(), AuditError> {
        Err(AuditError::Storage("database is locked".into()))
    }

    async fn query(&self, _username: Option<&str>) -> Result<Vec<InteractionRecord>, AuditError> {
        Ok(Vec::new())
    }
}
