//! Parsing of the reviewer's fixed-format response.
//!
//! ```text
//! VERDICT: APPROVE | CAUTION | BLOCK
//! SUMMARY: one line
//! SUSPECT_APIS: name, other
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewVerdict {
    Approve,
    Caution,
    Block,
}

impl std::fmt::Display for ReviewVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewVerdict::Approve => write!(f, "APPROVE"),
            ReviewVerdict::Caution => write!(f, "CAUTION"),
            ReviewVerdict::Block => write!(f, "BLOCK"),
        }
    }
}

/// Parsed review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildReview {
    pub verdict: ReviewVerdict,
    pub summary: String,
    pub suspect_apis: Vec<String>,
    /// False when no `VERDICT:` line could be read.
    pub well_formed: bool,
}

impl GuildReview {
    pub fn blocks(&self) -> bool {
        self.verdict == ReviewVerdict::Block
    }
}

fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let stripped = line.trim().trim_start_matches(['*', '-', ' ']);
    let (head, rest) = stripped.split_once(':')?;
    head.trim_matches('*')
        .trim()
        .eq_ignore_ascii_case(key)
        .then(|| rest.trim().trim_matches('*').trim())
}

/// Read the reviewer response. A missing or unreadable verdict is treated
/// as `CAUTION` so a malformed review never blocks on its own.
pub fn parse_review(text: &str) -> GuildReview {
    let mut verdict = None;
    let mut summary = None;
    let mut suspect_apis = Vec::new();

    for line in text.lines() {
        if verdict.is_none()
            && let Some(value) = field(line, "VERDICT")
        {
            let upper = value.to_ascii_uppercase();
            verdict = if upper.starts_with("BLOCK") {
                Some(ReviewVerdict::Block)
            } else if upper.starts_with("APPROVE") {
                Some(ReviewVerdict::Approve)
            } else if upper.starts_with("CAUTION") {
                Some(ReviewVerdict::Caution)
            } else {
                None
            };
        } else if summary.is_none()
            && let Some(value) = field(line, "SUMMARY")
        {
            summary = Some(value.to_string());
        } else if let Some(value) = field(line, "SUSPECT_APIS") {
            suspect_apis = value
                .split(',')
                .map(|s| s.trim().trim_matches('`').trim())
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
                .map(String::from)
                .collect();
        }
    }

    GuildReview {
        well_formed: verdict.is_some(),
        verdict: verdict.unwrap_or(ReviewVerdict::Caution),
        summary: summary.unwrap_or_else(|| "No summary provided.".to_string()),
        suspect_apis,
    }
}
