//! Tool dispatch: one entry point for every tool.
//!
//! Each call runs the same sequence:
//!
//! 1. **Quota** check against the session (refusal has no side effects)
//! 2. **Gateway** call(s) for the selected tool
//! 3. **Usage** recorded on the session
//! 4. **Audit** record appended
//!
//! A gateway failure stops at step 2. An audit failure does not undo the
//! dispatch; it is handed back in [`DispatchOutcome::audit_error`].

use crate::quota::QuotaGuard;
use penwright_core::audit::{AuditLogStore, InteractionRecord};
use penwright_core::error::{AuditError, DispatchError, ProviderError};
use penwright_core::gateway::{
    DEFAULT_TEMPERATURE, GenerationGateway, SearchGateway, join_snippets,
};
use penwright_core::session::Session;
use penwright_core::tool::Tool;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SUMMARIZE_PREFIX: &str = "Summarize this:\n";
const RESEARCH_PREFIX: &str = "Based on this:\n";
const EDIT_PREFIX: &str = "Edit and improve this:\n";

/// Result of a successful dispatch.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Generated text to show the user.
    pub output: String,

    /// The record that was appended, or would have been if the store failed.
    pub record: InteractionRecord,

    /// Set when the audit store rejected the record. The caller must tell
    /// the user the interaction was not logged.
    pub audit_error: Option<AuditError>,
}

impl DispatchOutcome {
    pub fn is_logged(&self) -> bool {
        self.audit_error.is_none()
    }
}

/// Routes tool requests to the gateways under the session quota.
pub struct Dispatcher {
    generation: Arc<dyn GenerationGateway>,
    search: Arc<dyn SearchGateway>,
    audit: Arc<dyn AuditLogStore>,
    quota: QuotaGuard,
    temperature: f32,
}

impl Dispatcher {
    pub fn new(
        generation: Arc<dyn GenerationGateway>,
        search: Arc<dyn SearchGateway>,
        audit: Arc<dyn AuditLogStore>,
    ) -> Self {
        Self {
            generation,
            search,
            audit,
            quota: QuotaGuard::default(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_quota(mut self, quota: QuotaGuard) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    pub fn audit(&self) -> &Arc<dyn AuditLogStore> {
        &self.audit
    }

    /// Run `tool` on `prompt` for the session's user.
    ///
    /// `prompt` is logged exactly as given, even though some tools send the
    /// generation service a prefixed version of it.
    pub async fn dispatch(
        &self,
        session: &mut Session,
        tool: Tool,
        prompt: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        if let Err(refused) = self.quota.check(session) {
            warn!(user = %session.username(), %tool, "Dispatch refused: {refused}");
            return Err(refused);
        }

        let output = match self.invoke(tool, prompt).await {
            Ok(output) => output,
            Err(e) => {
                warn!(user = %session.username(), %tool, error = %e, "Gateway call failed");
                return Err(e.into());
            }
        };

        self.quota.record_usage(session);

        let record = InteractionRecord::now(session.username(), tool, prompt, output.clone());
        let audit_error = match self.audit.append(&record).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user = %session.username(), %tool, error = %e, "Interaction was not logged");
                Some(e)
            }
        };

        info!(
            user = %session.username(),
            %tool,
            used = session.usage_count(),
            ceiling = self.quota.ceiling(),
            "Dispatch complete"
        );

        Ok(DispatchOutcome {
            output,
            record,
            audit_error,
        })
    }

    async fn invoke(&self, tool: Tool, prompt: &str) -> Result<String, ProviderError> {
        match tool {
            Tool::Write => self.generate(prompt).await,
            Tool::Summarize => self.generate(&format!("{SUMMARIZE_PREFIX}{prompt}")).await,
            Tool::Research => {
                let hits = self.search.query(prompt).await?;
                debug!(search = %self.search.name(), hits = hits.len(), "Research results");
                let summary = join_snippets(&hits);
                self.generate(&format!("{RESEARCH_PREFIX}{summary}")).await
            }
            Tool::Edit => self.generate(&format!("{EDIT_PREFIX}{prompt}")).await,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generation.complete(prompt, self.temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        FailingAuditStore, FailingGeneration, RecordingGeneration, ScriptedSearch,
    };
    use penwright_audit::InMemoryAuditStore;
    use penwright_core::gateway::SearchHit;
    use penwright_core::session::UserIdentity;

    struct Harness {
        generation: Arc<RecordingGeneration>,
        search: Arc<ScriptedSearch>,
        audit: Arc<InMemoryAuditStore>,
        dispatcher: Dispatcher,
    }

    fn harness(hits: Vec<SearchHit>) -> Harness {
        let generation = Arc::new(RecordingGeneration::new("generated"));
        let search = Arc::new(ScriptedSearch::new(hits));
        let audit = Arc::new(InMemoryAuditStore::new());
        let dispatcher = Dispatcher::new(generation.clone(), search.clone(), audit.clone());
        Harness {
            generation,
            search,
            audit,
            dispatcher,
        }
    }

    fn alice() -> Session {
        Session::new(UserIdentity::new("alice"))
    }

    #[tokio::test]
    async fn write_sends_prompt_verbatim_and_logs_it() {
        let h = harness(vec![]);
        let mut session = alice();

        let outcome = h
            .dispatcher
            .dispatch(&mut session, Tool::Write, "A poem about crabs")
            .await
            .unwrap();

        assert_eq!(outcome.output, "generated");
        assert!(outcome.is_logged());
        assert_eq!(h.generation.prompts(), vec!["A poem about crabs"]);
        assert_eq!(session.usage_count(), 1);

        let records = h.audit.query(Some("alice")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tool, "write");
        assert_eq!(records[0].input, "A poem about crabs");
        assert_eq!(records[0].output, "generated");
        assert_eq!(records[0], outcome.record);
    }

    #[tokio::test]
    async fn summarize_and_edit_prefix_the_prompt_but_log_the_original() {
        let h = harness(vec![]);
        let mut session = alice();

        h.dispatcher
            .dispatch(&mut session, Tool::Summarize, "long text")
            .await
            .unwrap();
        h.dispatcher
            .dispatch(&mut session, Tool::Edit, "draft")
            .await
            .unwrap();

        assert_eq!(
            h.generation.prompts(),
            vec!["Summarize this:\nlong text", "Edit and improve this:\ndraft"]
        );
        let inputs: Vec<String> = h
            .audit
            .query(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.input)
            .collect();
        assert_eq!(inputs, vec!["long text", "draft"]);
    }

    #[tokio::test]
    async fn research_joins_snippets_and_skips_missing_ones() {
        let h = harness(vec![
            SearchHit::with_snippet("A"),
            SearchHit::default(),
            SearchHit::with_snippet("B"),
        ]);
        let mut session = alice();

        let outcome = h
            .dispatcher
            .dispatch(&mut session, Tool::Research, "rust async")
            .await
            .unwrap();

        assert_eq!(h.search.queries(), vec!["rust async"]);
        assert_eq!(h.generation.prompts(), vec!["Based on this:\nA\n\nB"]);
        assert_eq!(outcome.record.tool, "research");
        assert_eq!(outcome.record.input, "rust async");
    }

    #[tokio::test]
    async fn research_with_no_hits_still_generates() {
        let h = harness(vec![]);
        let mut session = alice();
        h.dispatcher
            .dispatch(&mut session, Tool::Research, "nothing")
            .await
            .unwrap();
        assert_eq!(h.generation.prompts(), vec!["Based on this:\n"]);
    }

    #[tokio::test]
    async fn ceiling_refuses_without_side_effects() {
        let h = harness(vec![]);
        let mut session = alice();

        for i in 0..5 {
            h.dispatcher
                .dispatch(&mut session, Tool::Write, &format!("prompt {i}"))
                .await
                .unwrap();
        }
        assert_eq!(session.usage_count(), 5);
        assert_eq!(h.generation.call_count(), 5);

        let err = h
            .dispatcher
            .dispatch(&mut session, Tool::Research, "one more")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ExhaustedQuota {
                used: 5,
                ceiling: 5
            }
        ));
        assert_eq!(h.generation.call_count(), 5);
        assert!(h.search.queries().is_empty());
        assert_eq!(h.audit.count().await.unwrap(), 5);
        assert_eq!(session.usage_count(), 5);
    }

    #[tokio::test]
    async fn custom_ceiling_and_temperature_apply() {
        let h = harness(vec![]);
        let dispatcher = h.dispatcher.with_quota(QuotaGuard::new(1)).with_temperature(0.2);
        let mut session = alice();

        dispatcher
            .dispatch(&mut session, Tool::Write, "x")
            .await
            .unwrap();
        assert!((h.generation.temperatures()[0] - 0.2).abs() < f32::EPSILON);
        assert!(
            dispatcher
                .dispatch(&mut session, Tool::Write, "y")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn generation_failure_leaves_usage_and_log_untouched() {
        let audit = Arc::new(InMemoryAuditStore::new());
        let dispatcher = Dispatcher::new(
            Arc::new(FailingGeneration::new(ProviderError::RateLimited {
                retry_after_secs: 5,
            })),
            Arc::new(ScriptedSearch::new(vec![])),
            audit.clone(),
        );
        let mut session = alice();

        let err = dispatcher
            .dispatch(&mut session, Tool::Summarize, "text")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Provider(ProviderError::RateLimited { .. })
        ));
        assert_eq!(session.usage_count(), 0);
        assert_eq!(audit.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_failure_skips_generation() {
        let generation = Arc::new(RecordingGeneration::new("unused"));
        let audit = Arc::new(InMemoryAuditStore::new());
        let dispatcher = Dispatcher::new(
            generation.clone(),
            Arc::new(ScriptedSearch::failing(ProviderError::Network(
                "dns failure".into(),
            ))),
            audit.clone(),
        );
        let mut session = alice();

        let err = dispatcher
            .dispatch(&mut session, Tool::Research, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Provider(ProviderError::Network(_))));
        assert_eq!(generation.call_count(), 0);
        assert_eq!(session.usage_count(), 0);
        assert_eq!(audit.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn audit_failure_still_returns_output_and_counts_usage() {
        let dispatcher = Dispatcher::new(
            Arc::new(RecordingGeneration::new("kept")),
            Arc::new(ScriptedSearch::new(vec![])),
            Arc::new(FailingAuditStore),
        );
        let mut session = alice();

        let outcome = dispatcher
            .dispatch(&mut session, Tool::Write, "x")
            .await
            .unwrap();
        assert_eq!(outcome.output, "kept");
        assert!(!outcome.is_logged());
        assert!(matches!(outcome.audit_error, Some(AuditError::Storage(_))));
        assert_eq!(session.usage_count(), 1);
    }

    #[tokio::test]
    async fn sessions_are_counted_separately() {
        let h = harness(vec![]);
        let mut alice = alice();
        let mut bob = Session::new(UserIdentity::new("bob"));

        h.dispatcher
            .dispatch(&mut alice, Tool::Write, "a")
            .await
            .unwrap();
        h.dispatcher.dispatch(&mut bob, Tool::Edit, "b").await.unwrap();
        h.dispatcher
            .dispatch(&mut alice, Tool::Write, "c")
            .await
            .unwrap();

        assert_eq!(alice.usage_count(), 2);
        assert_eq!(bob.usage_count(), 1);
        assert_eq!(h.audit.query(Some("bob")).await.unwrap().len(), 1);
        assert_eq!(h.audit.query(Some("alice")).await.unwrap().len(), 2);
    }
}
