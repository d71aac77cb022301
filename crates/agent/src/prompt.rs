//! Prompt assembly from named templates.
//!
//! A template is just a prefix put in front of the user's text. The catalog
//! is built once at startup and never changes afterwards.

use std::collections::BTreeMap;
use tracing::warn;

/// Template name that means "no template". Never resolves to a prefix.
pub const NO_TEMPLATE: &str = "None";

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    (
        "Academic Summary",
        "Summarize the following academic article in simple terms:\n\n",
    ),
    (
        "SEO Blog",
        "Write a blog post with SEO optimization about:\n\n",
    ),
    ("Email Draft", "Draft a professional email to:\n\n"),
];

/// Immutable name → prefix table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    entries: Vec<(String, String)>,
}

impl TemplateCatalog {
    /// The three templates every deployment ships with.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TEMPLATES
                .iter()
                .map(|(name, prefix)| ((*name).to_string(), (*prefix).to_string()))
                .collect(),
        }
    }

    /// Merge extra templates from configuration.
    ///
    /// An extra with a built-in name replaces that prefix in place; new names
    /// follow the built-ins in name order. [`NO_TEMPLATE`] is skipped.
    pub fn with_extra(mut self, extra: &BTreeMap<String, String>) -> Self {
        for (name, prefix) in extra {
            if name == NO_TEMPLATE {
                warn!("Ignoring template named {NO_TEMPLATE:?}: the name is reserved");
                continue;
            }
            match self.entries.iter_mut().find(|(existing, _)| existing == name) {
                Some(entry) => entry.1 = prefix.clone(),
                None => self.entries.push((name.clone(), prefix.clone())),
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, prefix)| prefix.as_str())
    }

    /// Template names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the default prompt: the template prefix followed by `text`.
    ///
    /// Unknown names, `None` and [`NO_TEMPLATE`] leave the text unchanged.
    pub fn assemble(&self, template: Option<&str>, text: &str) -> String {
        match template.and_then(|name| self.get(name)) {
            Some(prefix) => format!("{prefix}{text}"),
            None => text.to_string(),
        }
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
