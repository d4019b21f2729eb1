//! Handoff text carried from one agent to the next.

use crate::core::string::suffix;
use crate::output::{NO_TODO_BLOCK, extract_todos_for};

pub const INITIAL_HANDOFF: &str = "Start from task statement; no upstream TODOs yet.";

pub const INDEPENDENT_HANDOFF: &str =
    "You are working INDEPENDENTLY. No prior agent output is available. Propose your own approach.";

/// Per-agent TODO blocks decomposed from the lead's output.
pub fn lead_handoff(lead_output: &str, downstream: &[String]) -> String {
    downstream
        .iter()
        .map(|agent| {
            let todos =
                extract_todos_for(agent, lead_output).unwrap_or_else(|| NO_TODO_BLOCK.to_string());
            format!("{agent} TODOs:\n{todos}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The latest output's tail, capped at `max_chars`.
pub fn carry_forward(agent: &str, output: &str, max_chars: usize) -> String {
    format!(
        "Carry forward previous findings and TODOs. Latest output from {agent}:\n{}",
        suffix(output, max_chars)
    )
}
