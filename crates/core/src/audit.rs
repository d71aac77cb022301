//! Audit log: the durable trail of every completed dispatch.
//!
//! Records are append-only: this crate defines no way to update or delete
//! one. Retrieval always preserves insertion order.

use crate::error::AuditError;
use crate::tool::Tool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the `logs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub username: String,

    /// Tool name as selected by the user (see [`Tool::as_str`]).
    pub tool: String,

    /// The prompt that was dispatched.
    pub input: String,

    /// The generated text.
    pub output: String,

    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    /// Build a record stamped with the current time.
    pub fn now(
        username: impl Into<String>,
        tool: Tool,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            tool: tool.as_str().to_string(),
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Durable, append-only storage for interaction records.
///
/// Implementations must accept concurrent `append` and `query` calls from
/// different sessions; each `append` is a single indivisible write.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Append one record.
    async fn append(&self, record: &InteractionRecord) -> Result<(), AuditError>;

    /// Records for `username`, or every record when `None`, in insertion order.
    ///
    /// Whether the caller may see every user's records is decided by the
    /// caller, not the store.
    async fn query(&self, username: Option<&str>) -> Result<Vec<InteractionRecord>, AuditError>;

    /// Total number of records.
    async fn count(&self) -> Result<usize, AuditError> {
        Ok(self.query(None).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_tool_name() {
        let record = InteractionRecord::now("alice", Tool::Summarize, "in", "out");
        assert_eq!(record.tool, "summarize");
        assert_eq!(record.username, "alice");
    }

    #[test]
    fn record_serializes_timestamp_as_iso8601() {
        let record = InteractionRecord::now("bob", Tool::Write, "in", "out");
        let json = serde_json::to_value(&record).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
