//! `penwright export`: Convert a document to txt, docx or pdf.

use penwright_documents::ExportFormat;
use std::path::Path;

pub async fn run(
    input: &Path,
    format: &str,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = super::read_document(input, None)?;

    let dir = match out {
        Some(dir) => dir,
        None => input.parent().unwrap_or(Path::new("")),
    };
    let mut stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();

    // Never overwrite the input with its own conversion.
    if let Ok(target) = format.parse::<ExportFormat>()
        && dir.join(format!("{stem}.{}", target.extension())) == input
    {
        stem.push_str("-export");
    }

    if let Some(path) = super::write_export(&text, format, dir, &stem)? {
        println!("  Saved {}", path.display());
    }

    Ok(())
}
