//! All structured fields of one agent output, extracted in a single pass.

use super::markers::{Confidence, MarkerCounts, count_markers, extract_confidence};
use super::sections::{extract_code_proposal, extract_next_run, extract_procedure, todo_items};

/// Fields derived from an agent's public text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFields {
    pub todos: Vec<String>,
    pub code_proposal: Option<String>,
    pub next_run: Option<String>,
    pub procedure: Option<String>,
    pub confidence: Confidence,
    pub markers: MarkerCounts,
}

impl OutputFields {
    pub fn extract(text: &str) -> Self {
        Self {
            todos: todo_items(text),
            code_proposal: extract_code_proposal(text),
            next_run: extract_next_run(text),
            procedure: extract_procedure(text),
            confidence: extract_confidence(text),
            markers: count_markers(text),
        }
    }
}
