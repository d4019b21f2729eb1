//! Mechanical inventory of callable names defined or used in source files.
//!
//! Anything followed by `(` counts, minus language keywords and casts.
//! The inventory is a grounding aid for reviewers, not a symbol table.

use crate::context::FileExcerpt;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static CALL_RE: OnceLock<Regex> = OnceLock::new();

fn call_re() -> &'static Regex {
    CALL_RE.get_or_init(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "return", "sizeof", "alignof", "decltype", "catch",
    "static_cast", "dynamic_cast", "const_cast", "reinterpret_cast", "static_assert", "defined",
    "layout", "main", "noexcept", "operator", "throw", "new", "delete", "assert", "typeid",
];

/// Sorted, de-duplicated callable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiInventory {
    names: BTreeSet<String>,
}

impl ApiInventory {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Comma-separated listing capped at `max_chars`.
    pub fn render(&self, max_chars: usize) -> String {
        let mut out = String::new();
        for name in &self.names {
            let extra = if out.is_empty() { name.len() } else { name.len() + 2 };
            if out.len() + extra > max_chars {
                out.push_str(", ...");
                break;
            }
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(name);
        }
        out
    }
}

/// Build the inventory from file contents.
pub fn api_inventory(files: &[FileExcerpt]) -> ApiInventory {
    let names = files
        .iter()
        .flat_map(|f| call_re().captures_iter(&f.content))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| !KEYWORDS.contains(name))
        .map(String::from)
        .collect();
    ApiInventory { names }
}
