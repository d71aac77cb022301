//! `penwright session`: Interactive session on stdin.
//!
//! Plain lines are dispatched with the current tool, after the current
//! template is applied. Slash commands change state or inspect it.

use super::{GlobalOpts, Runtime};
use penwright_agent::NO_TEMPLATE;
use penwright_core::{DispatchError, Session, Tool, UserIdentity};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Exit,
    Help,
    SetTool(String),
    SetTemplate(Option<String>),
    LoadFile(PathBuf),
    SendDocument,
    Export { format: String, dir: PathBuf },
    Logs { all: bool },
    Quota,
    Prompt(String),
    Empty,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit") {
            return Self::Exit;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Prompt(line.to_string());
        };

        let (command, arg) = match rest.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (rest, ""),
        };

        match command {
            "help" => Self::Help,
            "tool" => Self::SetTool(arg.to_string()),
            "template" if arg.is_empty() || arg == NO_TEMPLATE => Self::SetTemplate(None),
            "template" => Self::SetTemplate(Some(arg.to_string())),
            "file" if !arg.is_empty() => Self::LoadFile(PathBuf::from(arg)),
            "send" => Self::SendDocument,
            "export" if !arg.is_empty() => {
                let (format, dir) = match arg.split_once(char::is_whitespace) {
                    Some((format, dir)) => (format, dir.trim()),
                    None => (arg, "."),
                };
                Self::Export {
                    format: format.to_string(),
                    dir: PathBuf::from(dir),
                }
            }
            "logs" => Self::Logs { all: arg == "all" },
            "quota" => Self::Quota,
            _ => Self::Help,
        }
    }
}

/// What the user has selected so far.
struct SessionState {
    session: Session,
    tool: Tool,
    template: Option<String>,
    document: Option<String>,
    last_output: Option<String>,
}

pub async fn run(opts: &GlobalOpts, user: UserIdentity) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::build(opts).await?;

    let mut state = SessionState {
        session: Session::new(user),
        tool: Tool::Write,
        template: None,
        document: None,
        last_output: None,
    };

    println!();
    println!("  Penwright: Interactive Session");
    println!();
    println!("  User:      {}", state.session.username());
    println!("  Model:     {}", runtime.config.generation.model);
    println!(
        "  Quota:     {} requests this session",
        runtime.dispatcher.quota().ceiling()
    );
    println!();
    println!("  Type a prompt and press Enter. /help lists commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt_marker(&state)?;

    while let Some(line) = lines.next_line().await? {
        match SessionCommand::parse(&line) {
            SessionCommand::Exit => break,
            SessionCommand::Empty => {}
            SessionCommand::Help => print_help(),
            SessionCommand::SetTool(name) => match name.parse::<Tool>() {
                Ok(tool) => {
                    state.tool = tool;
                    println!("  Tool: {tool} ({})", tool.description());
                }
                Err(e) => eprintln!("  [Error] {e}"),
            },
            SessionCommand::SetTemplate(None) => {
                state.template = None;
                println!("  Template cleared.");
            }
            SessionCommand::SetTemplate(Some(name)) => {
                if runtime.catalog.get(&name).is_some() {
                    println!("  Template: {name}");
                    state.template = Some(name);
                } else {
                    let known: Vec<&str> = runtime.catalog.names().collect();
                    eprintln!("  [Error] Unknown template {name:?} (known: {})", known.join(", "));
                }
            }
            SessionCommand::LoadFile(path) => match super::read_document(&path, None) {
                Ok(text) if !text.is_empty() => {
                    let prompt = runtime.catalog.assemble(state.template.as_deref(), &text);
                    println!("  Loaded {} characters. Prompt to send:", text.chars().count());
                    for line in prompt.lines() {
                        println!("  | {line}");
                    }
                    println!("  Type /send to dispatch it, or type your own prompt.");
                    state.document = Some(text);
                }
                Ok(_) => {}
                Err(e) => eprintln!("  [Error] {e}"),
            },
            SessionCommand::SendDocument => match state.document.take() {
                Some(text) => {
                    let prompt = runtime.catalog.assemble(state.template.as_deref(), &text);
                    dispatch(&runtime, &mut state, &prompt).await;
                }
                None => eprintln!("  [Error] No document loaded. Use /file <path> first."),
            },
            SessionCommand::Prompt(text) => {
                let prompt = runtime.catalog.assemble(state.template.as_deref(), &text);
                dispatch(&runtime, &mut state, &prompt).await;
            }
            SessionCommand::Export { format, dir } => match &state.last_output {
                Some(output) => match super::write_export(output, &format, &dir, "output") {
                    Ok(Some(path)) => println!("  Saved {}", path.display()),
                    Ok(None) => {}
                    Err(e) => eprintln!("  [Error] {e}"),
                },
                None => eprintln!("  [Error] Nothing to export yet."),
            },
            SessionCommand::Logs { all } => {
                if all && !state.session.is_admin() {
                    eprintln!("  [Error] Only admins can view every user's logs.");
                } else {
                    let filter = if all { None } else { Some(state.session.username()) };
                    match runtime.dispatcher.audit().query(filter).await {
                        Ok(records) => super::print_records(&records),
                        Err(e) => eprintln!("  [Error] {e}"),
                    }
                }
            }
            SessionCommand::Quota => {
                let quota = runtime.dispatcher.quota();
                println!(
                    "  Used {} of {} requests ({} left).",
                    state.session.usage_count(),
                    quota.ceiling(),
                    quota.remaining(&state.session)
                );
            }
        }
        prompt_marker(&state)?;
    }

    println!("\n  Goodbye!");
    Ok(())
}

async fn dispatch(runtime: &Runtime, state: &mut SessionState, prompt: &str) {
    eprint!("  ...");
    let result = runtime
        .dispatcher
        .dispatch(&mut state.session, state.tool, prompt)
        .await;
    eprint!("\r     \r");

    match result {
        Ok(outcome) => {
            println!();
            super::run::print_outcome(&outcome);
            println!();
            state.last_output = Some(outcome.output);
        }
        Err(DispatchError::ExhaustedQuota { .. }) => {
            eprintln!("  You have reached the free usage limit for this session.");
            eprintln!("  Upgrade to continue, or start a new session.");
        }
        Err(e) => eprintln!("  [Error] {e}"),
    }
}

fn prompt_marker(state: &SessionState) -> std::io::Result<()> {
    print!("  {} > ", state.tool);
    std::io::stdout().flush()
}

fn print_help() {
    println!("  /tool <write|summarize|research|edit>   choose the tool");
    println!("  /template <name|None>                   choose a template");
    println!("  /file <path>                            load a pdf, docx or txt");
    println!("  /send                                   dispatch the loaded document");
    println!("  /export <txt|docx|pdf> [dir]            save the last output");
    println!("  /logs [all]                             show logged interactions");
    println!("  /quota                                  show remaining requests");
    println!("  exit                                    leave the session");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_prompts() {
        assert_eq!(
            SessionCommand::parse("  write me a haiku "),
            SessionCommand::Prompt("write me a haiku".into())
        );
        assert_eq!(SessionCommand::parse("   "), SessionCommand::Empty);
        assert_eq!(SessionCommand::parse("exit"), SessionCommand::Exit);
        assert_eq!(SessionCommand::parse("/quit"), SessionCommand::Exit);
    }

    #[test]
    fn slash_commands_parse_arguments() {
        assert_eq!(
            SessionCommand::parse("/tool research"),
            SessionCommand::SetTool("research".into())
        );
        assert_eq!(
            SessionCommand::parse("/template SEO Blog"),
            SessionCommand::SetTemplate(Some("SEO Blog".into()))
        );
        assert_eq!(
            SessionCommand::parse("/template None"),
            SessionCommand::SetTemplate(None)
        );
        assert_eq!(
            SessionCommand::parse("/file ./paper.pdf"),
            SessionCommand::LoadFile(PathBuf::from("./paper.pdf"))
        );
        assert_eq!(
            SessionCommand::parse("/export pdf out/dir"),
            SessionCommand::Export {
                format: "pdf".into(),
                dir: PathBuf::from("out/dir")
            }
        );
        assert_eq!(
            SessionCommand::parse("/export txt"),
            SessionCommand::Export {
                format: "txt".into(),
                dir: PathBuf::from(".")
            }
        );
        assert_eq!(SessionCommand::parse("/logs"), SessionCommand::Logs { all: false });
        assert_eq!(SessionCommand::parse("/logs all"), SessionCommand::Logs { all: true });
        assert_eq!(SessionCommand::parse("/quota"), SessionCommand::Quota);
        assert_eq!(SessionCommand::parse("/send"), SessionCommand::SendDocument);
    }

    #[test]
    fn unknown_or_incomplete_commands_show_help() {
        assert_eq!(SessionCommand::parse("/frobnicate"), SessionCommand::Help);
        assert_eq!(SessionCommand::parse("/file"), SessionCommand::Help);
        assert_eq!(SessionCommand::parse("/export"), SessionCommand::Help);
    }
}
