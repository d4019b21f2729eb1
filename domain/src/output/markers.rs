//! Cross-confirmation markers and the combined confidence line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static MARKER_RE: OnceLock<Regex> = OnceLock::new();
static CONFIDENCE_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"\b(CONCUR|QUALIFY|DISSENT)\b").unwrap())
}

fn confidence_re() -> &'static Regex {
    CONFIDENCE_RE.get_or_init(|| {
        Regex::new(r"(?i)Combined confidence:\s*\**\s*(HIGH|MEDIUM|LOW)\b").unwrap()
    })
}

/// Counts of cross-confirmation markers in one output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerCounts {
    pub concur: usize,
    pub qualify: usize,
    pub dissent: usize,
}

impl MarkerCounts {
    pub fn total(&self) -> usize {
        self.concur + self.qualify + self.dissent
    }

    /// `dissent / total`, or `None` when no markers exist.
    pub fn dissent_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.dissent as f64 / total as f64),
        }
    }
}

/// Count whole-word `CONCUR`, `QUALIFY`, and `DISSENT` markers.
pub fn count_markers(text: &str) -> MarkerCounts {
    let mut counts = MarkerCounts::default();
    for m in marker_re().find_iter(text) {
        match m.as_str() {
            "CONCUR" => counts.concur += 1,
            "QUALIFY" => counts.qualify += 1,
            _ => counts.dissent += 1,
        }
    }
    counts
}

/// Combined confidence declared by the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
            Confidence::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// First `Combined confidence: <level>` marker, or [`Confidence::Unknown`].
pub fn extract_confidence(text: &str) -> Confidence {
    match confidence_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
        .as_deref()
    {
        Some("HIGH") => Confidence::High,
        Some("MEDIUM") => Confidence::Medium,
        Some("LOW") => Confidence::Low,
        _ => Confidence::Unknown,
    }
}
