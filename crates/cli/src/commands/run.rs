//! `penwright run`: One tool dispatch in a fresh session.

use super::{GlobalOpts, Runtime};
use penwright_agent::DispatchOutcome;
use penwright_core::{Session, Tool, UserIdentity};
use std::path::PathBuf;

/// What to run, as given on the command line.
pub struct RunRequest {
    pub tool: Tool,
    pub template: Option<String>,
    pub file: Option<PathBuf>,
    pub media_type: Option<String>,
    pub text: Option<String>,
    pub prompt: Option<String>,
    pub export: Option<String>,
    pub out: PathBuf,
}

pub async fn run(
    opts: &GlobalOpts,
    user: UserIdentity,
    request: RunRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::build(opts).await?;
    let mut session = Session::new(user);

    let prompt = match request.prompt {
        Some(prompt) => prompt,
        None => {
            let text = match (&request.file, request.text) {
                (Some(path), _) => super::read_document(path, request.media_type.as_deref())?,
                (None, Some(text)) => text,
                (None, None) => return Err("Give the text with --text, --file or --prompt".into()),
            };
            runtime
                .catalog
                .assemble(request.template.as_deref(), &text)
        }
    };

    if prompt.trim().is_empty() {
        return Err("Nothing to send: the prompt is empty".into());
    }

    let outcome = runtime
        .dispatcher
        .dispatch(&mut session, request.tool, &prompt)
        .await?;
    print_outcome(&outcome);

    if let Some(format) = request.export
        && let Some(path) = super::write_export(&outcome.output, &format, &request.out, "output")?
    {
        println!("  Saved {}", path.display());
    }

    Ok(())
}

pub(crate) fn print_outcome(outcome: &DispatchOutcome) {
    println!("{}", outcome.output);
    if let Some(e) = &outcome.audit_error {
        eprintln!("  [Warning] This interaction was not logged: {e}");
    }
}
