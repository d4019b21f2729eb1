//! Tiered search/replace matching.
//!
//! Tiers are attempted in order and the first match wins. At most one
//! replacement is made per block.
//!
//! 1. [`MatchTier::Exact`]: verbatim substring
//! 2. [`MatchTier::TrailingWhitespace`]: whole lines equal after `trim_end`
//! 3. [`MatchTier::IndentAgnostic`]: whole lines equal after `trim`; the
//!    replacement is re-indented to the first matched line

use super::block::EditBlock;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    TrailingWhitespace,
    IndentAgnostic,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::TrailingWhitespace => write!(f, "trailing-whitespace"),
            MatchTier::IndentAgnostic => write!(f, "indent-agnostic"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("search text not found in {0}")]
    NotFound(String),

    #[error("empty search text for non-empty file {0}")]
    EmptySearch(String),
}

/// Lines of `s` with their terminators kept, so joins are lossless.
fn split_keep(s: &str) -> Vec<&str> {
    s.split_inclusive('\n').collect()
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn search_lines(search: &str) -> Vec<&str> {
    search.trim_end_matches(['\n', '\r']).split('\n').map(|l| l.trim_end_matches('\r')).collect()
}

/// First window of `content` lines equal to `needle` under `eq`.
fn find_window(content: &[&str], needle: &[&str], eq: impl Fn(&str, &str) -> bool) -> Option<usize> {
    if needle.is_empty() || needle.len() > content.len() {
        return None;
    }
    (0..=content.len() - needle.len()).find(|&start| {
        needle
            .iter()
            .enumerate()
            .all(|(j, n)| eq(strip_eol(content[start + j]), n))
    })
}

/// Replace `len` lines at `start` with `replacement`.
///
/// Replacement lines take the line terminator of the file. An empty
/// replacement removes the matched lines outright.
fn splice(content: &[&str], start: usize, len: usize, replacement: &str) -> String {
    let mut out: String = content[..start].concat();
    let last = content[start + len - 1];
    let eol = if content.iter().any(|l| l.ends_with("\r\n")) {
        "\r\n"
    } else {
        "\n"
    };
    let body = replacement.trim_end_matches(['\n', '\r']);
    if !body.is_empty() {
        let lines: Vec<&str> = body.split('\n').map(|l| l.trim_end_matches('\r')).collect();
        out.push_str(&lines.join(eol));
        if last.ends_with('\n') {
            out.push_str(eol);
        }
    }
    out.push_str(&content[start + len..].concat());
    out
}

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// `line` without its first `n` leading whitespace characters.
fn strip_indent(line: &str, n: usize) -> &str {
    let ws = leading_ws(line);
    let cut = ws.char_indices().nth(n).map_or(ws.len(), |(i, _)| i);
    &line[cut..]
}

/// Shift `replacement` so its least-indented line sits at `indent`.
///
/// Indentation is measured in characters, so any whitespace the model
/// emits (tabs, NBSP, ideographic spaces) is handled alike.
fn reindent(replacement: &str, indent: &str) -> String {
    let lines: Vec<&str> = replacement.trim_end_matches('\n').split('\n').collect();
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_ws(l).chars().count())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{}", strip_indent(l, common))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply one search/replace to `content`.
///
/// An empty search only applies to empty content (file creation).
pub fn apply_edit(
    file: &str,
    content: &str,
    search: &str,
    replace: &str,
) -> Result<(String, MatchTier), MatchError> {
    if search.trim().is_empty() {
        return if content.trim().is_empty() {
            Ok((replace.to_string(), MatchTier::Exact))
        } else {
            Err(MatchError::EmptySearch(file.to_string()))
        };
    }

    if content.contains(search) {
        return Ok((content.replacen(search, replace, 1), MatchTier::Exact));
    }

    let lines = split_keep(content);
    let needle = search_lines(search);

    if let Some(start) = find_window(&lines, &needle, |a, b| a.trim_end() == b.trim_end()) {
        return Ok((
            splice(&lines, start, needle.len(), replace),
            MatchTier::TrailingWhitespace,
        ));
    }

    if needle.iter().any(|l| !l.trim().is_empty())
        && let Some(start) = find_window(&lines, &needle, |a, b| a.trim() == b.trim())
    {
        let indent = leading_ws(lines[start]);
        return Ok((
            splice(&lines, start, needle.len(), &reindent(replace, indent)),
            MatchTier::IndentAgnostic,
        ));
    }

    Err(MatchError::NotFound(file.to_string()))
}

/// Result of applying one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub file: String,
    pub result: Result<MatchTier, MatchError>,
}

/// All block outcomes plus the new contents of every file that changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    pub contents: BTreeMap<String, String>,
    pub outcomes: Vec<BlockOutcome>,
}

impl EditResult {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn errors(&self) -> Vec<&MatchError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err()).collect()
    }
}

/// Apply blocks in order against `originals`. A block that fails to match
/// is reported and skipped; later blocks on the same file still see every
/// earlier successful edit. Files absent from `originals` start empty.
pub fn apply_blocks(originals: &BTreeMap<String, String>, blocks: &[EditBlock]) -> EditResult {
    let mut working: BTreeMap<String, String> = BTreeMap::new();
    let mut outcomes = Vec::with_capacity(blocks.len());

    for block in blocks {
        let current = working
            .get(&block.file)
            .or_else(|| originals.get(&block.file))
            .cloned()
            .unwrap_or_default();
        let result = apply_edit(&block.file, &current, &block.search, &block.replace).map(
            |(updated, tier)| {
                working.insert(block.file.clone(), updated);
                tier
            },
        );
        outcomes.push(BlockOutcome {
            file: block.file.clone(),
            result,
        });
    }

    let contents = working
        .into_iter()
        .filter(|(file, text)| originals.get(file) != Some(text))
        .collect();
    EditResult { contents, outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Tier Tests ====================

    #[test]
    fn test_exact_preferred_over_fuzzier_tiers() {
        // The trailing-whitespace window would also match line 1
        let content = "foo();  \nfoo();\n";
        let (out, tier) = apply_edit("a.cpp", content, "foo();\n", "bar();\n").unwrap();
        assert_eq!(tier, MatchTier::Exact);
        assert_eq!(out, "foo();  \nbar();\n");
    }

    #[test]
    fn test_exact_replaces_first_occurrence_only() {
        let (out, _) = apply_edit("a.cpp", "x; x; x;", "x;", "y;").unwrap();
        assert_eq!(out, "y; x; x;");
    }

    #[test]
    fn test_trailing_whitespace_tier() {
        let content = "int a = 1;   \nint b = 2;\t\nreturn a;\n";
        let (out, tier) = apply_edit("a.cpp", content, "int a = 1;\nint b = 2;", "int a = 3;\nint b = 4;").unwrap();
        assert_eq!(tier, MatchTier::TrailingWhitespace);
        assert_eq!(out, "int a = 3;\nint b = 4;\nreturn a;\n");
    }

    #[test]
    fn test_indent_agnostic_reindents_replacement() {
        let content = "void f() {\n        if (x) {\n            go();\n        }\n}\n";
        let search = "if (x) {\n    go();\n}";
        let replace = "if (x && y) {\n    go();\n    stop();\n}";
        let (out, tier) = apply_edit("a.cpp", content, search, replace).unwrap();
        assert_eq!(tier, MatchTier::IndentAgnostic);
        assert_eq!(
            out,
            "void f() {\n        if (x && y) {\n            go();\n            stop();\n        }\n}\n"
        );
    }

    #[test]
    fn test_no_match() {
        let err = apply_edit("a.cpp", "alpha\n", "beta", "gamma").unwrap_err();
        assert_eq!(err, MatchError::NotFound("a.cpp".to_string()));
    }

    #[test]
    fn test_empty_search_only_creates() {
        assert_eq!(
            apply_edit("new.h", "", "", "#pragma once\n").unwrap(),
            ("#pragma once\n".to_string(), MatchTier::Exact)
        );
        assert!(matches!(
            apply_edit("a.h", "int x;", "  ", "y"),
            Err(MatchError::EmptySearch(_))
        ));
    }

    #[test]
    fn test_crlf_content_matches_line_tiers() {
        let content = "a();\r\nb();\r\n";
        let (out, tier) = apply_edit("w.cpp", content, "  a();\n  b();", "c();\nd();").unwrap();
        assert_eq!(tier, MatchTier::IndentAgnostic);
        assert_eq!(out, "c();\r\nd();\r\n");
    }

    #[test]
    fn test_indent_agnostic_with_unicode_indentation() {
        let content = "void f() {\n    if (x) {\n        go();\n    }\n}\n";
        let (out, tier) = apply_edit(
            "a.cpp",
            content,
            "if (x) {\ngo();\n}",
            " a();\n\u{3000}b();\n\u{a0}\u{a0}c();",
        )
        .unwrap();
        assert_eq!(tier, MatchTier::IndentAgnostic);
        assert_eq!(out, "void f() {\n    a();\n    b();\n    \u{a0}c();\n}\n");
    }

    #[test]
    fn test_empty_replacement_removes_lines() {
        let content = "keep();\n  drop();  \n  gone();\nlast();\n";
        let (out, tier) = apply_edit("a.cpp", content, "drop();\ngone();", "").unwrap();
        assert_eq!(tier, MatchTier::IndentAgnostic);
        assert_eq!(out, "keep();\nlast();\n");

        let (out, tier) = apply_edit("a.cpp", "a();  \nb();\n", "a();\n", "").unwrap();
        assert_eq!(tier, MatchTier::TrailingWhitespace);
        assert_eq!(out, "b();\n");
    }

    // ==================== Block Sequence Tests ====================

    #[test]
    fn test_apply_blocks_sequential_and_partial() {
        let mut originals = BTreeMap::new();
        originals.insert("a.cpp".to_string(), "one\ntwo\n".to_string());
        let blocks = vec![
            EditBlock::new("a.cpp", "one", "uno"),
            EditBlock::new("a.cpp", "missing", "x"),
            EditBlock::new("a.cpp", "uno\ntwo", "uno\ndos"),
        ];
        let result = apply_blocks(&originals, &blocks);
        assert_eq!(result.applied(), 2);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.contents["a.cpp"], "uno\ndos\n");
    }

    #[test]
    fn test_apply_blocks_unchanged_file_not_reported() {
        let mut originals = BTreeMap::new();
        originals.insert("a.cpp".to_string(), "same".to_string());
        let result = apply_blocks(&originals, &[EditBlock::new("a.cpp", "same", "same")]);
        assert!(result.contents.is_empty());
        assert_eq!(result.applied(), 1);
    }
}
