//! Configuration loading, validation, and management for Penwright.
//!
//! Loads configuration from `~/.penwright/config.toml` with environment
//! variable overrides. Validates all settings at startup; the result is read
//! once and never changes for the life of the process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.penwright/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation provider settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Web-search provider settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Per-session usage limits
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Audit log storage
    #[serde(default)]
    pub audit: AuditConfig,

    /// Extra prompt templates (name → prefix), merged with the built-ins
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

/// Hide a credential in Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_generation_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_generation_url(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub api_url: String,

    #[serde(default = "default_engine")]
    pub engine: String,
}

fn default_search_url() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_engine() -> String {
    "google".into()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_search_url(),
            engine: default_engine(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("engine", &self.engine)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum tool dispatches per session
    #[serde(default = "default_ceiling")]
    pub ceiling: u32,
}

fn default_ceiling() -> u32 {
    5
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            ceiling: default_ceiling(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// SQLite database file holding the `logs` table
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "user_logs.db".into()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.penwright/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides:
    /// - `OPENAI_API_KEY`, `SERPAPI_API_KEY` (replace file credentials)
    /// - `PENWRIGHT_MODEL`
    /// - `PENWRIGHT_QUOTA_CEILING`
    /// - `PENWRIGHT_DB_PATH`
    ///
    /// Validation runs once, on the merged result.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env(var)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(key) = var("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.generation.api_key = Some(key);
        }
        if let Some(key) = var("SERPAPI_API_KEY").filter(|k| !k.is_empty()) {
            self.search.api_key = Some(key);
        }
        if let Some(model) = var("PENWRIGHT_MODEL") {
            self.generation.model = model;
        }
        if let Some(ceiling) = var("PENWRIGHT_QUOTA_CEILING") {
            self.quota.ceiling = ceiling.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "PENWRIGHT_QUOTA_CEILING must be a positive integer, got {ceiling:?}"
                ))
            })?;
        }
        if let Some(path) = var("PENWRIGHT_DB_PATH") {
            self.audit.database_path = path;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".penwright")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.quota.ceiling == 0 {
            return Err(ConfigError::ValidationError(
                "quota.ceiling must be at least 1".into(),
            ));
        }

        if self.audit.database_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "audit.database_path must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn has_generation_key(&self) -> bool {
        self.generation.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
