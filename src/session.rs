//! Review session state.
//!
//! Everything derived from one loaded manuscript lives here: the extracted
//! text, the reports produced so far, and the last progress observation.
//! `reset()` returns the session to its pre-load condition; loading a new
//! manuscript resets implicitly, so stale reports never outlive the text
//! they were produced from.

use crate::ai::prompts::AnalysisKind;
use crate::report::Report;

#[derive(Default)]
pub struct ReviewSession {
    text: Option<String>,
    reports: Vec<(AnalysisKind, Report)>,
    last_progress: Option<(usize, usize)>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manuscript's extracted text, discarding any previous state.
    pub fn load_text(&mut self, text: String) {
        self.reset();
        self.text = Some(text);
    }

    pub fn document_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.text.is_some()
    }

    /// Record the finished report for one check, replacing any earlier run.
    pub fn record_report(&mut self, kind: AnalysisKind, report: Report) {
        self.reports.retain(|(k, _)| *k != kind);
        self.reports.push((kind, report));
    }

    pub fn report(&self, kind: AnalysisKind) -> Option<&Report> {
        self.reports
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r)
    }

    /// All recorded reports in the order they were produced.
    pub fn reports(&self) -> impl Iterator<Item = (AnalysisKind, &Report)> {
        self.reports.iter().map(|(k, r)| (*k, r))
    }

    pub fn note_progress(&mut self, completed: usize, total: usize) {
        self.last_progress = Some((completed, total));
    }

    pub fn last_progress(&self) -> Option<(usize, usize)> {
        self.last_progress
    }

    /// Discard document text, reports and progress.
    pub fn reset(&mut self) {
        self.text = None;
        self.reports.clear();
        self.last_progress = None;
    }
}
