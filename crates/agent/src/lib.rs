//! The request path of the Penwright writing assistant.
//!
//! A front end builds a default prompt with the [`TemplateCatalog`], lets the
//! user edit it, then hands it to the [`Dispatcher`], which enforces the
//! session's [`QuotaGuard`], calls the gateways, and writes the audit record.

pub mod dispatcher;
pub mod prompt;
pub mod quota;

#[cfg(test)]
mod test_helpers;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use prompt::{NO_TEMPLATE, TemplateCatalog};
pub use quota::{DEFAULT_CEILING, QuotaGuard};
