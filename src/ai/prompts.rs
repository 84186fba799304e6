//! Instruction templates for the three editorial checks.

/// Which house-rule check an analysis request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisKind {
    /// Title, abstract and keyword compliance; opening window only.
    Structure,
    /// Grammar and in-text citation style; whole document, chunked.
    Grammar,
    /// Reference-list formatting; closing window only.
    References,
}

impl AnalysisKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Structure => "Structure",
            AnalysisKind::Grammar => "Grammar",
            AnalysisKind::References => "References",
        }
    }

    /// Whether this check walks the whole document in chunks.
    pub fn is_chunked(&self) -> bool {
        matches!(self, AnalysisKind::Grammar)
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            AnalysisKind::Structure => STRUCTURE_INSTRUCTION,
            AnalysisKind::Grammar => GRAMMAR_INSTRUCTION,
            AnalysisKind::References => REFERENCES_INSTRUCTION,
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const STRUCTURE_INSTRUCTION: &str = "\
You are the copy desk of an academic journal. Analyze the structure of the \
manuscript excerpt below: title, abstract and keywords. Check that each is \
present, in the expected order, and within the journal's limits (abstract up \
to 250 words, 3 to 5 keywords). List every deviation with a short correction.";

const GRAMMAR_INSTRUCTION: &str = "\
You are the copy desk of an academic journal. Review the manuscript excerpt \
below for grammar and for in-text citations in ABNT author-date style. \
Quote each problematic passage, explain the problem in one sentence, and \
give the corrected form.";

const REFERENCES_INSTRUCTION: &str = "\
You are the copy desk of an academic journal. Check the reference list in \
the manuscript excerpt below against NBR 6023: author format, work titles \
in bold, punctuation and element order. List each nonconforming entry with \
the corrected entry beneath it.";

/// Combine an instruction template with one excerpt into a single prompt.
pub fn build_prompt(instruction: &str, excerpt: &str) -> String {
    format!("{}\n\nMANUSCRIPT EXCERPT:\n---\n{}\n---", instruction, excerpt)
}
