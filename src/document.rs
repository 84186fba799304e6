//! Manuscript intake.
//!
//! Extracts the full text of an uploaded manuscript as a newline-joined
//! sequence of non-empty paragraphs. DOCX is the submission format; plain
//! text and Markdown are accepted for drafts. Everything downstream (the
//! chunker, the pipeline) sees only the extracted string.

use std::path::Path;

use crate::error::{Error, Result};

/// Read a manuscript file and extract its text.
pub fn read_manuscript(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    match ext.as_deref() {
        Some("docx") => {
            let bytes = std::fs::read(path)
                .map_err(|e| Error::Document(format!("failed to read {}: {}", path.display(), e)))?;
            extract_docx_text(&bytes)
        }
        Some("txt") | Some("md") => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| Error::Document(format!("failed to read {}: {}", path.display(), e)))?;
            Ok(clean_text(&raw))
        }
        other => Err(Error::Document(format!(
            "unsupported manuscript format: {:?} (expected .docx, .txt or .md)",
            other.unwrap_or("none")
        ))),
    }
}

/// Extract paragraph text from DOCX bytes.
///
/// Paragraph runs and hyperlink runs contribute in document order; table
/// cells are joined with ` | ` per row. Empty paragraphs are dropped.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let doc = docx_rs::read_docx(bytes)
        .map_err(|e| Error::Document(format!("failed to parse DOCX: {}", e)))?;

    let mut paragraphs = Vec::new();
    for child in &doc.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                paragraphs.push(paragraph_text(para));
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    let cells: Vec<String> = tr
                        .cells
                        .iter()
                        .map(|cell| {
                            let docx_rs::TableRowChild::TableCell(tc) = cell;
                            tc.children
                                .iter()
                                .filter_map(|content| match content {
                                    docx_rs::TableCellContent::Paragraph(para) => {
                                        Some(paragraph_text(para))
                                    }
                                    _ => None,
                                })
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect();
                    paragraphs.push(cells.join(" | "));
                }
            }
            _ => {}
        }
    }

    let text = clean_text(&paragraphs.join("\n"));
    tracing::debug!(
        "[Document] DOCX extracted: {} chars, {} paragraph(s)",
        text.len(),
        text.lines().count()
    );
    Ok(text)
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut text),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for child in &run.children {
        if let docx_rs::RunChild::Text(t) = child {
            out.push_str(&t.text);
        }
    }
}

/// Trim every line and drop the empty ones.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
