//! Subcommand implementations and the wiring they share.

pub mod export;
pub mod logs;
pub mod onboard;
pub mod run;
pub mod session;
pub mod templates;

use penwright_agent::{Dispatcher, QuotaGuard, TemplateCatalog};
use penwright_audit::{InMemoryAuditStore, SqliteAuditStore};
use penwright_config::AppConfig;
use penwright_core::audit::{AuditLogStore, InteractionRecord};
use penwright_core::gateway::{GenerationGateway, SearchGateway};
use penwright_documents::{DocumentKind, ExportFormat};
use penwright_providers::Unconfigured;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Flags that apply to every subcommand.
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub ephemeral: bool,
}

impl GlobalOpts {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
    }

    pub fn load_config(&self) -> CmdResult<AppConfig> {
        let config = AppConfig::load_with_env(&self.config_path())
            .map_err(|e| format!("Failed to load config: {e}"))?;
        Ok(config)
    }
}

/// Everything a dispatching command needs, built once per process.
pub struct Runtime {
    pub config: AppConfig,
    pub catalog: TemplateCatalog,
    pub dispatcher: Dispatcher,
}

impl Runtime {
    pub async fn build(opts: &GlobalOpts) -> CmdResult<Self> {
        let config = opts.load_config()?;

        if !config.has_generation_key() {
            eprintln!();
            eprintln!("  ERROR: No AI provider credential configured!");
            eprintln!();
            eprintln!("  Set OPENAI_API_KEY (in the environment or a .env file),");
            eprintln!("  or add generation.api_key to:");
            eprintln!("    {}", opts.config_path().display());
            eprintln!();
            return Err("No API key found. See above for setup instructions.".into());
        }

        let generation: Arc<dyn GenerationGateway> =
            Arc::new(penwright_providers::build_generation(&config)?);
        let search: Arc<dyn SearchGateway> = match penwright_providers::build_search(&config) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                warn!("Research is unavailable: {e}");
                Arc::new(Unconfigured::new(e))
            }
        };
        let audit = open_audit(&config, opts.ephemeral).await?;

        let dispatcher = Dispatcher::new(generation, search, audit)
            .with_quota(QuotaGuard::new(config.quota.ceiling))
            .with_temperature(config.generation.temperature);
        let catalog = template_catalog(&config);

        Ok(Self {
            config,
            catalog,
            dispatcher,
        })
    }
}

pub fn template_catalog(config: &AppConfig) -> TemplateCatalog {
    TemplateCatalog::builtin().with_extra(&config.templates)
}

pub async fn open_audit(config: &AppConfig, ephemeral: bool) -> CmdResult<Arc<dyn AuditLogStore>> {
    if ephemeral {
        return Ok(Arc::new(InMemoryAuditStore::new()));
    }
    let store = SqliteAuditStore::new(&config.audit.database_path).await?;
    Ok(Arc::new(store))
}

/// Read an uploaded document and extract its text. Without an explicit
/// media type, the extension decides; an unrecognised one yields no text.
pub fn read_document(path: &Path, media_type: Option<&str>) -> CmdResult<String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let declared = match media_type {
        Some(declared) => declared.to_string(),
        None => DocumentKind::guess_media_type(path).unwrap_or_default(),
    };
    let text = penwright_documents::extract(&bytes, &declared)?;
    if text.is_empty() {
        eprintln!("  {}", empty_text_notice(path, &declared));
    }
    Ok(text)
}

/// What to tell the user when a document produced no text.
fn empty_text_notice(path: &Path, declared: &str) -> String {
    if DocumentKind::from_media_type(declared).is_some() {
        return format!("No text found in {}; enter the text manually.", path.display());
    }
    let shown = if declared.is_empty() { "unknown" } else { declared };
    format!("Unsupported file type ({shown}); enter the text manually.")
}

/// Encode `content` and write `<dir>/<stem>.<ext>`. Returns `None` when no
/// encoder exists for `format`.
pub fn write_export(content: &str, format: &str, dir: &Path, stem: &str) -> CmdResult<Option<PathBuf>> {
    let Some(payload) = penwright_documents::encode_named(content, format)? else {
        let known: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.extension()).collect();
        eprintln!(
            "  No encoder available for {format:?} (choose one of: {}).",
            known.join(", ")
        );
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(payload.file_name(stem));
    std::fs::write(&path, &payload.bytes)?;
    Ok(Some(path))
}

pub fn print_records(records: &[InteractionRecord]) {
    if records.is_empty() {
        println!("  No interactions logged.");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        println!(
            "  {:>3}. {}  {:<10} {}",
            i + 1,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.username,
            record.tool
        );
        println!("       in:  {}", preview(&record.input));
        println!("       out: {}", preview(&record.output));
    }
}

/// First line of `text`, cut to 80 characters.
fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    let mut cut: String = first.chars().take(80).collect();
    if cut.len() < first.len() || text.lines().nth(1).is_some() {
        cut.push_str(" …");
    }
    cut
}
