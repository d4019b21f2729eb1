//! Source-file references mentioned in generated text.

use regex::Regex;

/// Paths with one of `extensions` that appear as standalone tokens
/// (whitespace or backtick delimited), in order, without duplicates.
pub fn referenced_source_files(text: &str, extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        return Vec::new();
    }
    let alternation = extensions
        .iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?m)(?:^|[\s`])([a-zA-Z][^\s`]*\.(?:{alternation}))(?:[\s`]|$)");
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut found: Vec<String> = Vec::new();
    // Delimiters are consumed by a match, so scan from each match's path end
    let mut start = 0;
    while let Some(caps) = re.captures_at(text, start) {
        let Some(path) = caps.get(1) else { break };
        if !found.iter().any(|f| f == path.as_str()) {
            found.push(path.as_str().to_string());
        }
        start = path.end();
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["cpp".to_string(), "h".to_string(), "comp".to_string()]
    }

    #[test]
    fn test_backticked_and_bare_paths() {
        let text = "Edit `src/a.cpp` then shaders/Engine.comp\nand src/a.cpp again";
        assert_eq!(
            referenced_source_files(text, &exts()),
            vec!["src/a.cpp", "shaders/Engine.comp"]
        );
    }

    #[test]
    fn test_adjacent_references_share_delimiter() {
        let text = "`a.h` `b.h`";
        assert_eq!(referenced_source_files(text, &exts()), vec!["a.h", "b.h"]);
    }

    #[test]
    fn test_other_extensions_ignored() {
        assert!(referenced_source_files("see notes.md and lib.rs", &exts()).is_empty());
        assert!(referenced_source_files("a.cpp", &[]).is_empty());
    }
}
