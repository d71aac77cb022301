//! Penwright CLI: the main entry point.
//!
//! Commands:
//! - `onboard`     Write a default config file
//! - `run`         One dispatch in a fresh session
//! - `session`     Interactive session on stdin
//! - `logs`        Show audit records
//! - `export`      Convert a document to txt, docx or pdf
//! - `templates`   List prompt templates

use clap::{Args, Parser, Subcommand};
use penwright_core::Tool;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "penwright",
    about = "Penwright: AI writing assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.penwright/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep the audit log in memory instead of SQLite
    #[arg(long, global = true)]
    ephemeral: bool,
}

/// Who is logged in.
#[derive(Args, Clone)]
struct UserArgs {
    /// Username to act as
    #[arg(short, long)]
    user: String,

    /// Grant admin rights (can see every user's logs)
    #[arg(long)]
    admin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Run one tool in a fresh session
    Run {
        #[command(flatten)]
        who: UserArgs,

        /// write, summarize, research or edit
        #[arg(short, long)]
        tool: Tool,

        /// Template to put in front of the text
        #[arg(long)]
        template: Option<String>,

        /// Document to read the text from (pdf, docx, txt)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Declared media type of --file (guessed from the extension if absent)
        #[arg(long, requires = "file")]
        media_type: Option<String>,

        /// Text to use when no file is given
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Send this prompt instead of the assembled one
        #[arg(long)]
        prompt: Option<String>,

        /// Also save the output as txt, docx or pdf
        #[arg(long)]
        export: Option<String>,

        /// Directory for --export
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Start an interactive session
    Session {
        #[command(flatten)]
        who: UserArgs,
    },

    /// Show audit log records
    Logs {
        #[command(flatten)]
        who: UserArgs,

        /// Every user's records (admin only)
        #[arg(long)]
        all: bool,
    },

    /// Convert a document to txt, docx or pdf
    Export {
        /// File to convert
        #[arg(short, long)]
        input: PathBuf,

        /// Target format
        #[arg(short, long)]
        format: String,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List prompt templates
    Templates,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may live in a .env next to the working directory.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let opts = commands::GlobalOpts {
        config: cli.config,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Onboard => commands::onboard::run(&opts).await?,
        Commands::Run {
            who,
            tool,
            template,
            file,
            media_type,
            text,
            prompt,
            export,
            out,
        } => {
            let request = commands::run::RunRequest {
                tool,
                template,
                file,
                media_type,
                text,
                prompt,
                export,
                out,
            };
            commands::run::run(&opts, who.identity(), request).await?
        }
        Commands::Session { who } => commands::session::run(&opts, who.identity()).await?,
        Commands::Logs { who, all } => commands::logs::run(&opts, who.identity(), all).await?,
        Commands::Export {
            input,
            format,
            out,
        } => commands::export::run(&input, &format, out.as_deref()).await?,
        Commands::Templates => commands::templates::run(&opts).await?,
    }

    Ok(())
}

impl UserArgs {
    fn identity(self) -> penwright_core::UserIdentity {
        if self.admin {
            penwright_core::UserIdentity::admin(self.user)
        } else {
            penwright_core::UserIdentity::new(self.user)
        }
    }
}
