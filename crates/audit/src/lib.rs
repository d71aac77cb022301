//! Audit log store implementations for Penwright.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryAuditStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAuditStore;
