//! Document handling for Penwright.
//!
//! - [`normalizer`] turns an uploaded PDF, DOCX or plain-text file into text.
//! - [`export`] turns text back into a downloadable `txt`, `docx` or `pdf`.
//!
//! Both sides are permissive about *kinds* they do not know: an unsupported
//! upload yields empty text and an unsupported export format yields no
//! payload, because the caller can always fall back to manual entry.

pub mod export;
pub mod normalizer;

pub use export::{ExportFormat, ExportPayload, encode, encode_named};
pub use normalizer::{DocumentKind, extract, extract_kind, join_pages};
