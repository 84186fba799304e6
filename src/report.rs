//! Report assembly.
//!
//! The pipeline appends one section per analyzed slice, in document order.
//! Rendering produces a single string in which a line-leading `###` marks a
//! section heading; the exporter turns those into structural headings.

/// A single labeled block of the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Ordered collection of analysis sections for one check.
#[derive(Debug, Clone, Default)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_section(&mut self, heading: impl Into<String>, body: impl Into<String>) {
        self.sections.push(Section {
            heading: heading.into(),
            body: body.into(),
        });
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render all sections as one string with `###` heading markers.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str("\n### ");
            out.push_str(&section.heading);
            out.push('\n');
            out.push_str(&section.body);
            out.push('\n');
        }
        out
    }

    /// Append every section of `other`, preserving order.
    pub fn extend(&mut self, other: Report) {
        self.sections.extend(other.sections);
    }
}
