//! Task documents: identifier, scope references, keywords, and the
//! free-text command override.

pub mod command;
pub mod scope;

pub use command::{TaskCommand, override_document};
pub use scope::{ScopeToken, normalize_path, scope_tokens};

use regex::Regex;
use std::sync::OnceLock;

static TASK_ID_RE: OnceLock<Regex> = OnceLock::new();

fn task_id_re() -> &'static Regex {
    TASK_ID_RE.get_or_init(|| Regex::new(r"## Task ID\s*\n\s*([A-Za-z0-9_-]+)").unwrap())
}

/// Fallback identifier when the document declares none.
pub const DEFAULT_TASK_ID: &str = "TASK";

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "that", "this", "then", "than", "make", "should",
    "must", "will", "when", "where", "which", "have", "each", "only", "also", "task",
];

/// A task document with its resolved identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDocument {
    pub id: String,
    pub text: String,
}

impl TaskDocument {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: extract_task_id(&text),
            text,
        }
    }

    /// Keywords used to rank scope files by relevance.
    pub fn keywords(&self) -> Vec<String> {
        task_keywords(&self.text)
    }
}

/// Identifier under a `## Task ID` heading, or [`DEFAULT_TASK_ID`].
pub fn extract_task_id(text: &str) -> String {
    task_id_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_TASK_ID.to_string())
}

/// Body of a `## <heading>` section, up to the next `## ` heading.
pub fn section_body<'a>(text: &'a str, heading: &str) -> Option<&'a str> {
    let marker = format!("## {heading}");
    let start = text.find(&marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find("\n## ").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Lowercase keywords (four or more letters, no stopwords) from the
/// action statement, falling back to the whole document.
pub fn task_keywords(text: &str) -> Vec<String> {
    let source = section_body(text, "Manual Action Statement").unwrap_or(text);
    let mut words: Vec<String> = Vec::new();
    for word in source
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .map(str::to_lowercase)
    {
        if word.len() >= 4 && !STOPWORDS.contains(&word.as_str()) && !words.contains(&word) {
            words.push(word);
        }
    }
    words
}
