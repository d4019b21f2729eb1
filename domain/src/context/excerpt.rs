//! Budgeted concatenation of file excerpts.

use super::budget::ContextBudget;
use crate::core::string::{head_tail, prefix};

/// Returned when the scope resolves to nothing.
pub const NO_SCOPE_FILES: &str = "No in-scope files found.";

const BUDGET_EXCEEDED: &str = "\n... [budget exceeded] ...";
const OMITTED: &str = "... [omitted: context budget reached] ...";

const SEPARATOR: &str = "\n\n";

/// Smallest remainder worth filling with a partial excerpt.
const MIN_PARTIAL: usize = 200;

/// One file's contents keyed by its repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExcerpt {
    pub path: String,
    pub content: String,
}

impl FileExcerpt {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Concatenate excerpts in order until the total budget is spent.
///
/// Each file is first capped to the per-file budget (head and tail kept).
/// Headers, separators and markers count against the total budget, so the
/// result never exceeds it. The file that crosses the total is cut with a
/// marker when a useful remainder is left after reserving room for the
/// placeholders of the files behind it; later files get an omitted
/// placeholder while one still fits.
pub fn assemble(files: &[FileExcerpt], budget: ContextBudget) -> String {
    if files.is_empty() {
        return NO_SCOPE_FILES.to_string();
    }
    let total = budget.total_chars();
    let header = |path: &str| format!("## {path}\n");
    let placeholder_cost = |f: &FileExcerpt| SEPARATOR.len() + header(&f.path).len() + OMITTED.len();

    let mut out = String::new();
    let mut spent = false;
    for (i, file) in files.iter().enumerate() {
        let sep = if out.is_empty() { "" } else { SEPARATOR };
        let head = header(&file.path);
        if !spent {
            let snippet = head_tail(&file.content, budget.per_file_chars());
            if out.len() + sep.len() + head.len() + snippet.len() <= total {
                out.push_str(&format!("{sep}{head}{snippet}"));
                continue;
            }
            spent = true;
            let reserve: usize = files[i + 1..].iter().map(placeholder_cost).sum();
            let room = total
                .saturating_sub(out.len() + sep.len() + head.len() + BUDGET_EXCEEDED.len() + reserve);
            if room > MIN_PARTIAL {
                out.push_str(&format!("{sep}{head}{}{BUDGET_EXCEEDED}", prefix(&snippet, room)));
                continue;
            }
        }
        let placeholder = format!("{sep}{head}{OMITTED}");
        if out.len() + placeholder.len() > total {
            break;
        }
        out.push_str(&placeholder);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope() {
        assert_eq!(assemble(&[], ContextBudget::default()), NO_SCOPE_FILES);
    }

    #[test]
    fn test_all_fit() {
        let files = vec![
            FileExcerpt::new("a.h", "struct A;"),
            FileExcerpt::new("a.cpp", "A::A() {}"),
        ];
        assert_eq!(
            assemble(&files, ContextBudget::default()),
            "## a.h\nstruct A;\n\n## a.cpp\nA::A() {}"
        );
    }

    #[test]
    fn test_per_file_cap_keeps_head_and_tail() {
        let body = format!("{}{}", "h".repeat(200), "t".repeat(200));
        let out = assemble(&[FileExcerpt::new("big.cpp", body)], ContextBudget::new(10_000, 100));
        assert!(out.contains("[truncated]"));
        assert!(out.contains(&"h".repeat(50)));
        assert!(out.contains(&"t".repeat(50)));
    }

    #[test]
    fn test_budget_cut_then_omitted() {
        let files = vec![
            FileExcerpt::new("one.cpp", "a".repeat(600)),
            FileExcerpt::new("two.cpp", "b".repeat(600)),
            FileExcerpt::new("three.cpp", "c".repeat(600)),
        ];
        let out = assemble(&files, ContextBudget::new(1000, 3000));
        assert!(out.len() <= 1000);
        assert!(out.starts_with(&format!("## one.cpp\n{}", "a".repeat(600))));
        assert!(out.contains(&format!("## two.cpp\n{}", "b".repeat(250))));
        assert!(out.contains(&format!("b{BUDGET_EXCEEDED}\n\n## three.cpp\n")));
        assert!(out.ends_with(&format!("## three.cpp\n{OMITTED}")));
    }

    #[test]
    fn test_small_remainder_omits_instead_of_cutting() {
        let files = vec![
            FileExcerpt::new("one.cpp", "a".repeat(900)),
            FileExcerpt::new("two.cpp", "b".repeat(600)),
        ];
        let out = assemble(&files, ContextBudget::new(1000, 3000));
        assert!(out.len() <= 1000);
        assert!(out.ends_with(&format!("## two.cpp\n{OMITTED}")));
    }

    #[test]
    fn test_headers_and_markers_count_against_total() {
        let files: Vec<FileExcerpt> = (0..12)
            .map(|i| FileExcerpt::new(format!("src/module_{i}.cpp"), "x".repeat(700)))
            .collect();
        for total in [50, 300, 1_000, 2_500, 5_000] {
            let out = assemble(&files, ContextBudget::new(total, 1_000));
            assert!(out.len() <= total, "{} > {}", out.len(), total);
        }
    }
}
