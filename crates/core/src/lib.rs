//! # Penwright Core
//!
//! Domain types, traits, and error definitions for the Penwright writing
//! assistant. This crate has **no I/O dependencies**: it defines the model
//! that every other crate implements against.
//!
//! The external services (text generation, web search) and the audit log are
//! traits here; their implementations live in `penwright-providers` and
//! `penwright-audit`, which keeps the dispatcher testable with doubles.

pub mod audit;
pub mod error;
pub mod gateway;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use audit::{AuditLogStore, InteractionRecord};
pub use error::{AuditError, DispatchError, DocumentError, ProviderError};
pub use gateway::{GenerationGateway, SearchGateway, SearchHit, join_snippets};
pub use session::{Session, UserIdentity};
pub use tool::Tool;
