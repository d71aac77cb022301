//! Text normalizer: uploaded bytes in, plain text out.
//!
//! | Declared type | Extraction |
//! |---|---|
//! | `application/pdf` | per page via pdf-extract, empty pages skipped |
//! | DOCX (Office Open XML) | one line per body paragraph via docx-rs |
//! | `text/plain` | UTF-8 decode |
//! | anything else | empty string |

use penwright_core::error::DocumentError;
use std::path::Path;
use tracing::{debug, warn};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MEDIA_TYPE: &str = "text/plain";

/// The upload kinds the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Match a declared media type. Case and parameters
    /// (`; charset=utf-8`) are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MEDIA_TYPE => Some(Self::Pdf),
            DOCX_MEDIA_TYPE => Some(Self::Docx),
            TEXT_MEDIA_TYPE => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Guess the media type of a file from its extension.
    ///
    /// Returns the guessed type even when it is not one we can extract, so
    /// callers can still pass it through [`extract`] and get empty text.
    pub fn guess_media_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path)
            .first_raw()
            .map(|m| m.to_string())
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::PlainText => "plain text",
        }
    }
}

/// Extract plain text from `bytes` of the declared media type.
///
/// Unknown declared types produce `Ok("")`; only a malformed document of a
/// supported type is an error.
pub fn extract(bytes: &[u8], declared_type: &str) -> Result<String, DocumentError> {
    match DocumentKind::from_media_type(declared_type) {
        Some(kind) => extract_kind(bytes, kind),
        None => {
            debug!(declared_type, "Unsupported upload type, no text extracted");
            Ok(String::new())
        }
    }
}

pub fn extract_kind(bytes: &[u8], kind: DocumentKind) -> Result<String, DocumentError> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::PlainText => {
            String::from_utf8(bytes.to_vec()).map_err(|e| DocumentError::Malformed {
                kind: kind.label(),
                reason: e.to_string(),
            })?
        }
    };

    debug!(kind = kind.label(), chars = text.len(), "Extracted upload text");
    Ok(text)
}

/// Join per-page text in page order. Pages with no text (empty or only
/// whitespace) are dropped rather than turned into blank lines.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter_map(|page| {
            let text = page.as_ref().trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    // pdf-extract can panic on malformed fonts/glyphs
    let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF extraction failed");
            return Err(DocumentError::Malformed {
                kind: "PDF",
                reason: e.to_string(),
            });
        }
        Err(_panic) => {
            warn!("PDF extraction panicked, likely a malformed font");
            return Err(DocumentError::Malformed {
                kind: "PDF",
                reason: "parser panicked on malformed content".into(),
            });
        }
    };

    debug!(pages = pages.len(), "PDF pages extracted");
    Ok(join_pages(pages))
}

fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let doc = docx_rs::read_docx(bytes).map_err(|e| DocumentError::Malformed {
        kind: "DOCX",
        reason: e.to_string(),
    })?;

    let paragraphs: Vec<String> = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut output = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for link_child in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = link_child {
                        push_run_text(run, &mut output);
                    }
                }
            }
            _ => {}
        }
    }
    output
}

fn push_run_text(run: &docx_rs::Run, output: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            output.push_str(&text.text);
        }
    }
}
