//! Extraction of structured fields from agent output.
//!
//! Generated text is only semi-structured, so every extractor here returns
//! `Option`: `None` is the explicit "not found" outcome, never an error.
//! Callers decide the fallback.

pub mod fields;
pub mod markers;
pub mod reasoning;
pub mod sections;

pub use fields::OutputFields;
pub use markers::{Confidence, MarkerCounts, count_markers, extract_confidence};
pub use reasoning::{ReasoningSplit, split_reasoning};
pub use sections::{
    NO_TODO_BLOCK, count_sections, extract_code_proposal, extract_next_run, extract_procedure,
    extract_todos_for, todo_items,
};
