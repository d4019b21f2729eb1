//! Backticked path references in task bullets.

/// One scope reference as written in the task document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeToken {
    /// A plain relative path; dropped later if it does not exist.
    Path(String),
    /// A glob pattern; expanded later against the working tree.
    Glob(String),
}

/// Repository-relative form of `raw`: `.` segments and repeated slashes
/// removed. Absolute paths and paths with `..` segments name something
/// outside the repository and yield `None`.
pub fn normalize_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with('/') || raw.starts_with('\\') || raw.get(1..2) == Some(":") {
        return None;
    }
    let mut parts = Vec::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => return None,
            _ => parts.push(part),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

impl ScopeToken {
    fn classify(raw: &str) -> Option<Self> {
        let path = normalize_path(raw)?;
        Some(if path.contains(['*', '?', '[']) {
            ScopeToken::Glob(path)
        } else {
            ScopeToken::Path(path)
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScopeToken::Path(p) | ScopeToken::Glob(p) => p,
        }
    }
}

fn backticked(line: &str) -> impl Iterator<Item = &str> {
    line.split('`')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.trim())
        .filter(|s| !s.is_empty())
}

/// Collect scope tokens from bullet lines, in document order.
///
/// Bullets nested under an "out of scope" bullet are skipped until the
/// next "in scope" bullet or heading. Paths are normalized and any that
/// escape the repository are dropped. Duplicates are kept; the resolver
/// de-duplicates after expansion.
pub fn scope_tokens(text: &str) -> Vec<ScopeToken> {
    let mut tokens = Vec::new();
    let mut excluded = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            excluded = false;
            continue;
        }
        if !trimmed.starts_with('-') {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if lower.contains("out of scope") {
            excluded = true;
        } else if lower.contains("in scope") {
            excluded = false;
        }
        if excluded || !trimmed.contains('`') {
            continue;
        }
        tokens.extend(backticked(trimmed).filter_map(ScopeToken::classify));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_glob_tokens() {
        let text = "## Scope\n- In scope:\n  - `src/a.cpp`\n  - `src/world/*` and `shaders/*.comp`\n";
        assert_eq!(
            scope_tokens(text),
            vec![
                ScopeToken::Path("src/a.cpp".to_string()),
                ScopeToken::Glob("src/world/*".to_string()),
                ScopeToken::Glob("shaders/*.comp".to_string()),
            ]
        );
    }

    #[test]
    fn test_out_of_scope_bullets_skipped() {
        let text = "- In scope:\n  - `src/a.cpp`\n- Out of scope:\n  - `third_party/*`\n## Output Location\n- Report: `runs/x.md`\n";
        let tokens: Vec<String> = scope_tokens(text).iter().map(|t| t.as_str().to_string()).collect();
        assert_eq!(tokens, vec!["src/a.cpp", "runs/x.md"]);
    }

    #[test]
    fn test_paths_normalized_and_escapes_dropped() {
        let text = "- In scope:\n  - `./src/a.cpp`\n  - `src//b.cpp`\n  - `../secrets.env`\n  - `/etc/passwd`\n  - `src/../../x`\n  - `./shaders/*.comp`\n";
        assert_eq!(
            scope_tokens(text),
            vec![
                ScopeToken::Path("src/a.cpp".to_string()),
                ScopeToken::Path("src/b.cpp".to_string()),
                ScopeToken::Glob("shaders/*.comp".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./src/./a.cpp").as_deref(), Some("src/a.cpp"));
        assert_eq!(normalize_path("C:/Windows"), None);
        assert_eq!(normalize_path("."), None);
        assert_eq!(normalize_path("src/.."), None);
    }

    #[test]
    fn test_non_bullet_lines_ignored() {
        assert!(scope_tokens("Edit `src/a.cpp` please").is_empty());
    }
}
