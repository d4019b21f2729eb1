//! Numbered output sections and the fields carried inside them.

use regex::Regex;
use std::sync::OnceLock;

/// Handoff text used when the lead left no block for an agent.
pub const NO_TODO_BLOCK: &str =
    "No explicit TODO block found; use previous agent findings as input.";

static NEXT_RUN_RE: OnceLock<Regex> = OnceLock::new();
static NEXT_RUN_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static PROCEDURE_RE: OnceLock<Regex> = OnceLock::new();
static PROPOSAL_RE: OnceLock<Regex> = OnceLock::new();
static TODOS_RE: OnceLock<Regex> = OnceLock::new();

fn next_run_re() -> &'static Regex {
    NEXT_RUN_RE.get_or_init(|| {
        Regex::new(r"(?is)9\)\s*Recommended Next Run(.*?)(?:\n## |\n\d+\)|\z)").unwrap()
    })
}

fn next_run_heading_re() -> &'static Regex {
    NEXT_RUN_HEADING_RE.get_or_init(|| {
        Regex::new(r"(?is)#+\s*Recommended Next Run[^\n]*\n(.*?)(?:\n#+ |\z)").unwrap()
    })
}

fn procedure_re() -> &'static Regex {
    PROCEDURE_RE.get_or_init(|| {
        Regex::new(r"(?is)[78]\)\s*Procedure Recording(.*?)(?:\n## |\n\d+\)|\z)").unwrap()
    })
}

fn proposal_re() -> &'static Regex {
    PROPOSAL_RE.get_or_init(|| {
        Regex::new(r"(?is)6\)\s*Code Proposal(.*?)(?:\n\d+\)\s*[A-Za-z]|\z)").unwrap()
    })
}

fn todos_re() -> &'static Regex {
    TODOS_RE.get_or_init(|| {
        Regex::new(r"(?is)4\)\s*Actionable TODOs[^\n]*\n(.*?)(?:\n\d+\)\s*[A-Za-z]|\z)").unwrap()
    })
}

/// Pattern recognizing one expected section label.
///
/// `"4) Actionable TODOs"` matches any number before the label, so
/// renumbered sections still count.
fn section_pattern(section: &str) -> Option<Regex> {
    let pattern = match section.split_once(')') {
        Some((_, label)) if !label.trim().is_empty() => {
            format!(r"(?i)\d+\)\s*{}", regex::escape(label.trim()))
        }
        _ => format!("(?i){}", regex::escape(section.trim())),
    };
    Regex::new(&pattern).ok()
}

/// How many of `sections` appear in `text`.
pub fn count_sections(text: &str, sections: &[String]) -> usize {
    sections
        .iter()
        .filter_map(|s| section_pattern(s))
        .filter(|re| re.is_match(text))
        .count()
}

fn clean(m: &str) -> Option<String> {
    let trimmed = m.trim().trim_start_matches(':').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Next-run recommendation, ignoring explicit "none" answers.
///
/// Tries the numbered `9) Recommended Next Run` section first, then a
/// markdown heading of the same name.
pub fn extract_next_run(text: &str) -> Option<String> {
    let found = next_run_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| clean(m.as_str()))
        .or_else(|| {
            next_run_heading_re()
                .captures(text)
                .and_then(|c| c.get(1))
                .and_then(|m| clean(m.as_str()))
        })?;
    let head: String = found.chars().take(20).collect::<String>().to_lowercase();
    if head.contains("none") {
        None
    } else {
        Some(found)
    }
}

/// A reusable procedure worth recording, if the agent found one.
pub fn extract_procedure(text: &str) -> Option<String> {
    let body = procedure_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| clean(m.as_str()))?;
    let lower = body.to_lowercase();
    if body.len() <= 20 || lower.contains("none") || lower.contains("no new") {
        return None;
    }
    Some(body)
}

/// The body of the `6) Code Proposal` section.
pub fn extract_code_proposal(text: &str) -> Option<String> {
    proposal_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| clean(m.as_str()))
}

/// One entry per bullet line in the `Actionable TODOs` section.
pub fn todo_items(text: &str) -> Vec<String> {
    let Some(body) = todos_re().captures(text).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    body.as_str()
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .map(|item| item.trim_start_matches("[ ]").trim().to_string())
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// The `<agent> TODOs:` block the lead wrote for `agent`.
pub fn extract_todos_for(agent: &str, text: &str) -> Option<String> {
    let pattern = format!(r"(?is){}\s*TODOs?:(.*?)(?:\n\n|\z)", regex::escape(agent));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| clean(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const OUTPUT: &str = "1) Main Task Outcome\nDone.\n\n4) Actionable TODOs\n- [ ] src/a.cpp:12 guard null (risk: crash)\n- tidy includes\n\n6) Code Proposal\n```cpp\nint x = 1;\n```\n\n7) Cross-Confirmation\nCONCUR\n\n8) Procedure Recording\nAlways pair barrier changes with a validation-layer run.\n\n9) Recommended Next Run\n`Follow \"wire pool\"` - ready.";

    // ==================== Section Counting Tests ====================

    #[test]
    fn test_count_sections_ignores_numbering() {
        let wanted = sections(&["1) Main Task Outcome", "2) Code Proposal", "3) Missing Bit"]);
        assert_eq!(count_sections(OUTPUT, &wanted), 2);
    }

    #[test]
    fn test_count_sections_plain_labels() {
        let wanted = sections(&["Cross-Confirmation", "Nowhere"]);
        assert_eq!(count_sections(OUTPUT, &wanted), 1);
    }

    // ==================== Field Extraction Tests ====================

    #[test]
    fn test_next_run_numbered() {
        assert_eq!(
            extract_next_run(OUTPUT).as_deref(),
            Some("`Follow \"wire pool\"` - ready.")
        );
    }

    #[test]
    fn test_next_run_none_is_ignored() {
        assert_eq!(
            extract_next_run("9) Recommended Next Run\nNone - task is self-contained."),
            None
        );
    }

    #[test]
    fn test_next_run_heading_fallback() {
        let text = "## Recommended Next Run\nCharge \"apply fix\"\n## Other";
        assert_eq!(extract_next_run(text).as_deref(), Some("Charge \"apply fix\""));
    }

    #[test]
    fn test_procedure_extraction() {
        assert_eq!(
            extract_procedure(OUTPUT).as_deref(),
            Some("Always pair barrier changes with a validation-layer run.")
        );
        assert_eq!(extract_procedure("8) Procedure Recording\nNo new procedure."), None);
        assert_eq!(extract_procedure("8) Procedure Recording\nshort"), None);
    }

    #[test]
    fn test_code_proposal_stops_at_next_section() {
        assert_eq!(
            extract_code_proposal(OUTPUT).as_deref(),
            Some("```cpp\nint x = 1;\n```")
        );
    }

    #[test]
    fn test_todo_items() {
        assert_eq!(
            todo_items(OUTPUT),
            vec!["src/a.cpp:12 guard null (risk: crash)", "tidy includes"]
        );
        assert!(todo_items("nothing").is_empty());
    }

    #[test]
    fn test_extract_todos_for_agent() {
        let lead = "Vulkan Guru TODOs:\n- check barriers\n- audit sync\n\nKernel Expert TODO: tune workgroups";
        assert_eq!(
            extract_todos_for("Vulkan Guru", lead).as_deref(),
            Some("- check barriers\n- audit sync")
        );
        assert_eq!(
            extract_todos_for("kernel expert", lead).as_deref(),
            Some("tune workgroups")
        );
        assert_eq!(extract_todos_for("Refactorer", lead), None);
    }
}
