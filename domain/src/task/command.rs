//! Operator task command: a free-text instruction that replaces the task
//! document wholesale.

use crate::util::slug_upper;

/// Longest slug carried into a generated task id.
const SLUG_LEN: usize = 24;

/// A free-text command and the context needed to expand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand<'a> {
    pub command: &'a str,
    pub macro_name: Option<&'a str>,
    pub default_scope: &'a [String],
    pub agents: &'a [String],
    /// Agent whose output is decomposed into handoff TODOs.
    pub lead: Option<&'a str>,
}

impl TaskCommand<'_> {
    /// `<MACRO|TASK>-<SLUG|CMD>`, derived only from the command and macro.
    pub fn task_id(&self) -> String {
        let prefix = self
            .macro_name
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "TASK".to_string());
        let slug = slug_upper(self.command, SLUG_LEN);
        let slug = if slug.is_empty() { "CMD".to_string() } else { slug };
        format!("{prefix}-{slug}")
    }
}

/// Regenerate a full task document from a command.
///
/// Returns `None` when the command is blank, meaning the original
/// document stays in force.
pub fn override_document(cmd: &TaskCommand<'_>) -> Option<String> {
    let command = cmd.command.trim();
    if command.is_empty() {
        return None;
    }
    let scope = cmd
        .default_scope
        .iter()
        .map(|p| format!("    - `{p}`"))
        .collect::<Vec<_>>()
        .join("\n");
    let order = cmd
        .agents
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {a}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let mut doc = format!(
        "# Current Manual Task\n\n## Task ID\n{}\n\n## Manual Action Statement\n{command}\n\n## Scope\n- In scope:\n{scope}\n- Out of scope:\n    - Third-party libraries\n    - Unrelated feature work\n\n## Sequential Execution Order\n{order}\n",
        cmd.task_id()
    );
    if let Some(lead) = cmd.lead {
        let downstream = cmd
            .agents
            .iter()
            .filter(|a| a.as_str() != lead)
            .map(|a| format!("- {a} TODOs"))
            .collect::<Vec<_>>();
        if !downstream.is_empty() {
            doc.push_str(&format!(
                "\n## {lead} Required Handoff TODOs\nAfter {lead} completes main + secondary tasks, create TODO blocks for:\n{}\n",
                downstream.join("\n")
            ));
        }
    }
    Some(doc)
}
