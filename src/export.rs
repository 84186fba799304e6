//! Report export.
//!
//! Turns a rendered report string into a downloadable DOCX: one title
//! heading, a generated-on line, then the report body where a line-leading
//! `###` becomes a level-1 heading and every other non-empty line a
//! paragraph.

use std::io::Cursor;
use std::path::Path;

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};

use crate::error::{Error, Result};

const HEADING_STYLE: &str = "Heading1";

/// Build the DOCX bytes for a report.
pub fn render_docx(report_text: &str, title: &str) -> Result<Vec<u8>> {
    let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();

    let mut docx = Docx::new().add_style(
        Style::new(HEADING_STYLE, StyleType::Paragraph)
            .name("Heading 1")
            .size(28)
            .bold(),
    );

    docx = docx.add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).size(36).bold()),
    );
    docx = docx.add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(format!("Generated on {}", generated_on))),
    );

    for line in report_text.lines() {
        if let Some(heading) = line.strip_prefix("###") {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .style(HEADING_STYLE)
                    .add_run(Run::new().add_text(heading.trim())),
            );
        } else if !line.trim().is_empty() {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Error::Export(format!("failed to assemble DOCX: {}", e)))?;
    Ok(buf.into_inner())
}

/// Render a report and write it to `path`.
pub fn export_docx(report_text: &str, title: &str, path: &Path) -> Result<()> {
    let bytes = render_docx(report_text, title)?;
    std::fs::write(path, bytes)
        .map_err(|e| Error::Export(format!("failed to write {}: {}", path.display(), e)))?;
    tracing::info!("[Export] Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract_docx_text;
    use crate::report::Report;

    #[test]
    fn test_headings_and_paragraphs_survive_roundtrip() {
        let mut report = Report::new();
        report.push_section("Part 1 of 2", "No issues found.");
        report.push_section("Part 2 of 2", "Two citation problems.");

        let bytes = render_docx(&report.render(), "Grammar report").unwrap();
        let text = extract_docx_text(&bytes).unwrap();

        assert!(text.contains("Grammar report"));
        assert!(text.contains("Part 1 of 2"));
        assert!(text.contains("No issues found."));
        assert!(text.contains("Part 2 of 2"));
        assert!(text.contains("Two citation problems."));
        // Heading markers are consumed, not carried into the document.
        assert!(!text.contains("###"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");

        export_docx("\n### Structure\nAll good.\n", "Structure report", &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        let text = extract_docx_text(&bytes).unwrap();
        assert!(text.contains("All good."));
    }
}
