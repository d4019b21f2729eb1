//! Output-structure contract appended to every agent prompt.

use crate::macros::schema::DEFAULT_SECTIONS;

const REASONING_RULE: &str = "Put private deliberation inside <reasoning>...</reasoning>. It is stripped before anything is published.";

const CROSS_CONFIRM_RULE: &str = "Mark each prior finding CONCUR, QUALIFY, or DISSENT and end with `Combined confidence: HIGH|MEDIUM|LOW`.";

fn default_detail(section: &str) -> &'static str {
    match section {
        "4) Actionable TODOs" => " (one line per item with file, line, and risk)",
        "7) Cross-Confirmation" => " (CONCUR/QUALIFY/DISSENT for prior agent findings)",
        "8) Procedure Recording" => " (only if you discovered a new reusable pattern)",
        "9) Recommended Next Run" => {
            " (suggest the next macro and task command)\n   Format: `<Macro> \"<task_command>\"` with a one-line rationale.\n   If no follow-up is needed, write: `None: task is self-contained.`"
        }
        _ => "",
    }
}

/// Render the section contract.
///
/// A non-empty `custom` list replaces the default nine sections; the
/// cross-confirmation section is included only when `cross_confirm` is set.
pub fn section_contract(custom: &[String], cross_confirm: bool) -> String {
    let mut lines = vec!["Return markdown with these exact sections:".to_string()];
    if custom.is_empty() {
        for section in DEFAULT_SECTIONS {
            if !cross_confirm && section.starts_with("7)") {
                continue;
            }
            lines.push(format!("{section}{}", default_detail(section)));
        }
    } else {
        lines.extend(custom.iter().cloned());
        if cross_confirm {
            lines.push(format!("{}{}", DEFAULT_SECTIONS[6], default_detail(DEFAULT_SECTIONS[6])));
        }
    }
    lines.push(String::new());
    lines.push(REASONING_RULE.to_string());
    if cross_confirm {
        lines.push(CROSS_CONFIRM_RULE.to_string());
    }
    lines.join("\n")
}
