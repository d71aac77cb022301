//! Error types for the Penwright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures of the external generation and search services.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Reasons a tool dispatch was refused or failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Usage limit reached for this session ({used}/{ceiling} requests)")]
    ExhaustedQuota { used: u32, ceiling: u32 },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed {kind} document: {reason}")]
    Malformed { kind: &'static str, reason: String },

    #[error("Failed to encode {format} export: {reason}")]
    Encode { format: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = DispatchError::from(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn exhausted_quota_reports_ceiling() {
        let err = DispatchError::ExhaustedQuota { used: 5, ceiling: 5 };
        assert_eq!(
            err.to_string(),
            "Usage limit reached for this session (5/5 requests)"
        );
    }

    #[test]
    fn provider_failure_is_transparent_inside_dispatch() {
        let err: DispatchError = ProviderError::Network("connection reset".into()).into();
        assert_eq!(err.to_string(), "Network error: connection reset");
    }
}
