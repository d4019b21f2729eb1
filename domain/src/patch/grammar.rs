//! Edit block grammars.
//!
//! Models drift between renderings, so three grammars are tried in order
//! and the first one yielding at least one block wins:
//!
//! 1. **Strict**: delimiter markers
//!    ```text
//!    FILE: src/a.cpp
//!    SEARCH: <<<
//!    old
//!    >>>
//!    REPLACE: <<<
//!    new
//!    >>>
//!    ```
//! 2. **Fenced**: `FILE:` / `SEARCH:` / `REPLACE:` labels, each body in a
//!    markdown code fence
//! 3. **Header**: markdown headings or bold labels such as
//!    `### File: src/a.cpp`, `#### Search`, `**Replace:**`, bodies fenced

use super::block::{EditBlock, normalize_path};

/// Which grammar produced the blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockGrammar {
    Strict,
    Fenced,
    Header,
}

impl std::fmt::Display for BlockGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockGrammar::Strict => write!(f, "strict"),
            BlockGrammar::Fenced => write!(f, "fenced"),
            BlockGrammar::Header => write!(f, "header"),
        }
    }
}

/// Blocks found by one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlocks {
    pub grammar: BlockGrammar,
    pub blocks: Vec<EditBlock>,
}

/// Try each grammar in order. `None` means no grammar matched anything.
pub fn parse_edit_blocks(text: &str) -> Option<ParsedBlocks> {
    let attempts: [(BlockGrammar, fn(&[&str]) -> Vec<EditBlock>); 3] = [
        (BlockGrammar::Strict, parse_strict),
        (BlockGrammar::Fenced, parse_fenced_labels),
        (BlockGrammar::Header, parse_headers),
    ];
    let lines: Vec<&str> = text.lines().collect();
    attempts.into_iter().find_map(|(grammar, parse)| {
        let blocks = parse(&lines);
        (!blocks.is_empty()).then_some(ParsedBlocks { grammar, blocks })
    })
}

/// Value after an uppercase `KEY:` label, tolerating bold and backtick
/// decoration. Mixed-case labels belong to the header grammar.
fn label_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let stripped = line.trim().trim_start_matches(['*', '`', '-', ' ']);
    let (head, rest) = stripped.split_once(':')?;
    (head.trim_end_matches('*') == key).then(|| rest.trim_start_matches('*').trim())
}

// ==================== Strict ====================

/// Body lines after a `<<<` opener up to a `>>>` line.
fn delimited_body(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    let mut body = Vec::new();
    while i < lines.len() {
        if lines[i].trim() == ">>>" {
            return Some((body.join("\n"), i + 1));
        }
        body.push(lines[i]);
        i += 1;
    }
    None
}

/// Locate the `<<<` opener for a label at `i`; returns the first body line.
fn delimited_start(lines: &[&str], i: usize, value: &str) -> Option<usize> {
    if value == "<<<" {
        return Some(i + 1);
    }
    if value.is_empty() && lines.get(i + 1).is_some_and(|l| l.trim() == "<<<") {
        return Some(i + 2);
    }
    None
}

fn parse_strict(lines: &[&str]) -> Vec<EditBlock> {
    let mut blocks = Vec::new();
    let mut file: Option<String> = None;
    let mut search: Option<String> = None;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(value) = label_value(line, "FILE") {
            file = Some(normalize_path(value));
            search = None;
            i += 1;
        } else if let Some(value) = label_value(line, "SEARCH")
            && let Some(start) = delimited_start(lines, i, value)
            && let Some((body, next)) = delimited_body(lines, start)
        {
            search = Some(body);
            i = next;
        } else if let Some(value) = label_value(line, "REPLACE")
            && let Some(start) = delimited_start(lines, i, value)
            && let Some((body, next)) = delimited_body(lines, start)
        {
            if let (Some(f), Some(s)) = (&file, search.take()) {
                blocks.push(EditBlock::new(f.clone(), s, body));
            }
            i = next;
        } else {
            i += 1;
        }
    }
    blocks
}

// ==================== Fenced ====================

/// Content of the next code fence starting at or after `start`, skipping
/// blank lines only. Returns the content and the index after the fence.
fn fenced_body(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    if !lines.get(i)?.trim_start().starts_with("```") {
        return None;
    }
    let mut body = Vec::new();
    i += 1;
    while i < lines.len() {
        if lines[i].trim() == "```" {
            return Some((body.join("\n"), i + 1));
        }
        body.push(lines[i]);
        i += 1;
    }
    None
}

type LineTest = fn(&str) -> Option<String>;
type LabelTest = fn(&str) -> bool;

fn parse_fenced_with(
    lines: &[&str],
    file_of: LineTest,
    is_search: LabelTest,
    is_replace: LabelTest,
) -> Vec<EditBlock> {
    let mut blocks = Vec::new();
    let mut file: Option<String> = None;
    let mut search: Option<String> = None;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(path) = file_of(line) {
            file = Some(path);
            search = None;
            i += 1;
        } else if is_search(line)
            && let Some((body, next)) = fenced_body(lines, i + 1)
        {
            search = Some(body);
            i = next;
        } else if is_replace(line)
            && let Some((body, next)) = fenced_body(lines, i + 1)
        {
            if let (Some(f), Some(s)) = (&file, search.take()) {
                blocks.push(EditBlock::new(f.clone(), s, body));
            }
            i = next;
        } else {
            i += 1;
        }
    }
    blocks
}

fn parse_fenced_labels(lines: &[&str]) -> Vec<EditBlock> {
    parse_fenced_with(
        lines,
        |line| {
            label_value(line, "FILE")
                .filter(|v| !v.is_empty())
                .map(normalize_path)
        },
        |line| label_value(line, "SEARCH").is_some_and(str::is_empty),
        |line| label_value(line, "REPLACE").is_some_and(str::is_empty),
    )
}

// ==================== Header ====================

/// Heading or bold label text, lowercased, without markup or a trailing colon.
fn header_text(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let inner = if trimmed.starts_with('#') {
        trimmed.trim_start_matches('#')
    } else if trimmed.starts_with("**") {
        trimmed
    } else {
        return None;
    };
    Some(inner.replace("**", "").trim().to_string())
}

fn header_file(line: &str) -> Option<String> {
    let text = header_text(line)?;
    let (head, rest) = text.split_once(':')?;
    (head.trim().eq_ignore_ascii_case("file") && !rest.trim().is_empty())
        .then(|| normalize_path(rest))
}

fn header_is(line: &str, names: &[&str]) -> bool {
    header_text(line).is_some_and(|t| {
        let t = t.trim_end_matches(':').trim().to_lowercase();
        names.contains(&t.as_str())
    })
}

fn parse_headers(lines: &[&str]) -> Vec<EditBlock> {
    parse_fenced_with(
        lines,
        header_file,
        |line| header_is(line, &["search", "find", "search block"]),
        |line| header_is(line, &["replace", "replace with", "replace block"]),
    )
}
