//! Unified diff and `--numstat` reading.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static DIFF_GIT_RE: OnceLock<Regex> = OnceLock::new();
static FENCED_DIFF_RE: OnceLock<Regex> = OnceLock::new();
static HUNK_RE: OnceLock<Regex> = OnceLock::new();

fn diff_git_re() -> &'static Regex {
    DIFF_GIT_RE.get_or_init(|| Regex::new(r"^diff --git a/(.+?) b/(.+)$").unwrap())
}

fn hunk_re() -> &'static Regex {
    HUNK_RE.get_or_init(|| Regex::new(r"^@@ -\d+(?:,(\d+))? \+\d+(?:,(\d+))? @@").unwrap())
}

fn fenced_diff_re() -> &'static Regex {
    FENCED_DIFF_RE.get_or_init(|| Regex::new(r"(?s)```(?:diff|patch)\n(.*?)\n```").unwrap())
}

/// Path named by a `---`/`+++` line, without its `a/`/`b/` prefix or a
/// trailing timestamp. `/dev/null` names no file.
fn marker_path(rest: &str) -> Option<&str> {
    let path = rest.split('\t').next().unwrap_or(rest).trim();
    if path.is_empty() || path == "/dev/null" {
        return None;
    }
    Some(
        path.strip_prefix("a/")
            .or_else(|| path.strip_prefix("b/"))
            .unwrap_or(path),
    )
}

/// Files touched by a unified diff, in order, without duplicates.
///
/// Every way `git apply` can name a target counts: `diff --git` headers,
/// `---`/`+++` lines (with or without a preceding header), and the
/// `rename`/`copy` extended headers. Both sides of a rename are listed.
pub fn changed_files(diff: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    let mut push = |f: &str| {
        if !files.iter().any(|x| x == f) {
            files.push(f.to_string());
        }
    };
    // Lines still owed by the current hunk (old side, new side). Body
    // lines such as `--- x` are content, not headers.
    let mut owed = (0usize, 0usize);
    for line in diff.lines() {
        let line = line.trim_end_matches('\r');
        if owed.0 > 0 || owed.1 > 0 {
            match line.chars().next() {
                Some('-') => owed.0 = owed.0.saturating_sub(1),
                Some('+') => owed.1 = owed.1.saturating_sub(1),
                Some('\\') => {}
                _ => {
                    owed.0 = owed.0.saturating_sub(1);
                    owed.1 = owed.1.saturating_sub(1);
                }
            }
            continue;
        }
        if let Some(caps) = hunk_re().captures(line) {
            let count = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .unwrap_or(1)
            };
            owed = (count(1), count(2));
        } else if let Some(caps) = diff_git_re().captures(line) {
            for side in [caps.get(1), caps.get(2)].into_iter().flatten() {
                push(side.as_str());
            }
        } else if let Some(rest) = line
            .strip_prefix("--- ")
            .or_else(|| line.strip_prefix("+++ "))
        {
            if let Some(path) = marker_path(rest) {
                push(path);
            }
        } else if let Some(path) = ["rename from ", "rename to ", "copy from ", "copy to "]
            .iter()
            .find_map(|p| line.strip_prefix(p))
        {
            push(path.trim());
        }
    }
    files
}

/// Paths from `git apply --numstat -z`. Renames and copies report both
/// the source and the destination.
pub fn numstat_paths(output: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    let mut push = |f: &str| {
        if !f.is_empty() && !files.iter().any(|x| x == f) {
            files.push(f.to_string());
        }
    };
    let mut tokens = output.split('\0');
    while let Some(token) = tokens.next() {
        let mut parts = token.splitn(3, '\t');
        let (Some(_), Some(_), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        if path.is_empty() {
            for side in tokens.by_ref().take(2) {
                push(side);
            }
        } else {
            push(path);
        }
    }
    files
}

/// Pull a diff out of a free-form response: a ```` ```diff ```` fence
/// first, then everything from the first `diff --git` header.
pub fn extract_legacy_patch(response: &str) -> Option<String> {
    if let Some(body) = fenced_diff_re().captures(response).and_then(|c| c.get(1))
        && body.as_str().contains("diff --git")
    {
        return Some(format!("{}\n", body.as_str().trim()));
    }
    let start = response.find("diff --git ")?;
    let tail = response[start..].trim();
    // a closing fence left behind by the model is not part of the diff
    let tail = tail.strip_suffix("```").unwrap_or(tail).trim_end();
    Some(format!("{tail}\n"))
}

/// Totals from `git diff --numstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStat {
    pub fn changed_lines(&self) -> usize {
        self.additions + self.deletions
    }
}

impl std::fmt::Display for DiffStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "files={}, additions={}, deletions={}",
            self.files, self.additions, self.deletions
        )
    }
}

/// Sum `--numstat` lines. Binary entries (`-\t-\tpath`) count as a file
/// with no line changes.
pub fn parse_numstat(output: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for line in output.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(adds), Some(dels), Some(_path)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        stat.files += 1;
        stat.additions += adds.trim().parse::<usize>().unwrap_or(0);
        stat.deletions += dels.trim().parse::<usize>().unwrap_or(0);
    }
    stat
}
