//! Export encoder: text in, downloadable file out.
//!
//! The PDF layout follows a simple cell model: every input line becomes one
//! fixed-height cell, stacked top to bottom, with a page break whenever the
//! next cell would cross the bottom margin.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use penwright_core::error::DocumentError;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::normalizer::{DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE, TEXT_MEDIA_TYPE};

/// Points per millimetre.
const MM: f32 = 72.0 / 25.4;
/// A4 portrait, in points.
const PAGE_WIDTH: f32 = 210.0 * MM;
const PAGE_HEIGHT: f32 = 297.0 * MM;
const LEFT_MARGIN: f32 = 10.0 * MM;
const TOP_MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 20.0 * MM;
const CELL_HEIGHT: f32 = 10.0 * MM;
const FONT_SIZE: f32 = 12.0;

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Txt, ExportFormat::Docx, ExportFormat::Pdf];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Txt => TEXT_MEDIA_TYPE,
            Self::Docx => DOCX_MEDIA_TYPE,
            Self::Pdf => PDF_MEDIA_TYPE,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "docx" => Ok(Self::Docx),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("no encoder for format {other:?}")),
        }
    }
}

/// An encoded export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub extension: &'static str,
}

impl ExportPayload {
    /// Download name for this payload, e.g. `output.pdf`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }
}

/// Encode `content` in the given format.
pub fn encode(content: &str, format: ExportFormat) -> Result<ExportPayload, DocumentError> {
    let bytes = match format {
        ExportFormat::Txt => content.as_bytes().to_vec(),
        ExportFormat::Docx => encode_docx(content)?,
        ExportFormat::Pdf => encode_pdf(content)?,
    };

    debug!(format = %format, bytes = bytes.len(), "Encoded export");
    Ok(ExportPayload {
        bytes,
        media_type: format.media_type(),
        extension: format.extension(),
    })
}

/// Encode by format name. An unrecognized name yields `Ok(None)`, meaning
/// no encoder is available.
pub fn encode_named(content: &str, format: &str) -> Result<Option<ExportPayload>, DocumentError> {
    match format.parse::<ExportFormat>() {
        Ok(format) => encode(content, format).map(Some),
        Err(reason) => {
            debug!(%reason, "Export skipped");
            Ok(None)
        }
    }
}

fn encode_docx(content: &str) -> Result<Vec<u8>, DocumentError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    docx_rs::Docx::new()
        .add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(content)))
        .build()
        .pack(&mut buf)
        .map_err(|e| DocumentError::Encode {
            format: "docx",
            reason: e.to_string(),
        })?;
    Ok(buf.into_inner())
}

fn encode_pdf(content: &str) -> Result<Vec<u8>, DocumentError> {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    let pages: Vec<Vec<&str>> = lines.chunks(cells_per_page()).map(<[_]>::to_vec).collect();
    render_pdf_pages(&pages)
}

/// How many cells fit between the top and bottom margins.
fn cells_per_page() -> usize {
    (((PAGE_HEIGHT - TOP_MARGIN - BOTTOM_MARGIN) / CELL_HEIGHT).floor() as usize).max(1)
}

/// Render pre-paginated lines, one page per entry. An empty entry makes a
/// page with no text on it.
pub(crate) fn render_pdf_pages(pages: &[Vec<&str>]) -> Result<Vec<u8>, DocumentError> {
    let encode_err = |e: lopdf::Error| DocumentError::Encode {
        format: "pdf",
        reason: e.to_string(),
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in pages {
        let mut operations = Vec::with_capacity(page_lines.len() * 2 + 3);
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        for (row, line) in page_lines.iter().enumerate() {
            let cell_top = PAGE_HEIGHT - TOP_MARGIN - row as f32 * CELL_HEIGHT;
            let baseline = cell_top - CELL_HEIGHT / 2.0 - 0.3 * FONT_SIZE;
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    LEFT_MARGIN.into(),
                    baseline.into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(encode_err)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| DocumentError::Encode {
        format: "pdf",
        reason: e.to_string(),
    })?;
    Ok(bytes)
}

/// Encodes a line for the standard Helvetica font under `WinAnsiEncoding`.
///
/// ASCII and Latin-1 map to themselves. The 0x80..=0x9F range holds the
/// typographic characters (curly quotes, dashes, euro sign); the C1 control
/// codes and anything else without a slot become `?`.
fn to_win_ansi(line: &str) -> Vec<u8> {
    line.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{0000}'..='\u{007F}' | '\u{00A0}'..='\u{00FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => b'?',
    }
}
