//! Fixed prompts for the auxiliary generation calls.

use crate::core::string::prefix;

/// Appended to a prompt whose output the gate rejected structurally.
const RETRY_HEADER: &str = "# RETRY INSTRUCTION";

/// Inputs for the edit-block patch prompt.
#[derive(Debug, Clone, Copy)]
pub struct PatchPromptInput<'a> {
    pub task: &'a str,
    /// `(agent, public output)` pairs.
    pub outputs: &'a [(String, String)],
    /// Current contents of referenced files, already budgeted.
    pub file_contents: &'a str,
    pub api_inventory: &'a str,
    pub allowlist: &'a [String],
    pub per_output_chars: usize,
}

/// Templates for the non-agent calls
pub struct PromptTemplate;

impl PromptTemplate {
    /// Corrective suffix after a RETRY verdict.
    pub fn retry_instruction(prompt: &str, gate_message: &str) -> String {
        format!(
            "{prompt}\n\n{RETRY_HEADER}\nYour previous output was rejected: {gate_message}\nRewrite your complete output with ALL required sections."
        )
    }

    /// Ask for a self-contained maintenance task.
    pub fn self_task(pipeline_name: &str, readme: &str, schedule: &str, agents: &[String]) -> String {
        let order = agents
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}. {a}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"Create one autonomous in-between maintenance task for the {pipeline_name} agent system.
The task must be unrelated to the current manual main task and safe to review in a pull request.

Use these docs:

# Agent README
{readme}

# Schedule
{schedule}

Return markdown with exact sections:
## Task ID
<SHORT-ID>

## Manual Action Statement
<one sentence>

## Scope
- In scope:
  - `<path>`
- Out of scope:
  - `<path/category>`

## Sequential Execution Order
{order}"#
        )
    }

    /// Cross-check of the aggregate outputs against the real API surface.
    pub fn guild_review(
        task: &str,
        outputs: &[(String, String)],
        per_output_chars: usize,
        api_inventory: &str,
    ) -> String {
        let aggregated = outputs
            .iter()
            .map(|(name, text)| format!("## {name}\n{}", prefix(text, per_output_chars)))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            r#"You are the guild reviewer. Cross-check the agent outputs below against the task and the real codebase.
Flag any code proposal that calls a function or method that is not in the API inventory.

# Active Task
{task}

# Agent Outputs
{aggregated}

# API Inventory (names callable in the in-scope files)
{api_inventory}

Respond with exactly these lines:
VERDICT: APPROVE | CAUTION | BLOCK
SUMMARY: <one line>
SUSPECT_APIS: <comma-separated names, or none>

Use BLOCK only when a proposal would clearly break the build or contradicts the codebase."#
        )
    }

    /// Edit-block patch request.
    pub fn patch_blocks(input: &PatchPromptInput<'_>) -> String {
        let aggregated = input
            .outputs
            .iter()
            .map(|(name, text)| format!("## {name}\n{}", prefix(text, input.per_output_chars)))
            .collect::<Vec<_>>()
            .join("\n\n");
        let allowed = input
            .allowlist
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"Turn the agent proposals below into concrete search/replace edits.
Treat the proposals as intent, not literal code. The current file contents are authoritative.
Replacement code may only call APIs listed in the API inventory.
Only edit files from the allowed list. Keep the change minimal.

# Active Task
{task}

# Agent Proposals
{aggregated}

# Current File Contents
{files}

# API Inventory
{inventory}

# Allowed Files
{allowed}

Return one or more blocks in exactly this format and nothing else:
FILE: <path>
SEARCH: <<<
<exact lines copied from the current file>
>>>
REPLACE: <<<
<replacement lines>
>>>"#,
            task = input.task,
            files = input.file_contents,
            inventory = input.api_inventory,
        )
    }

    /// Whole-diff request used when no edit blocks could be derived.
    pub fn legacy_patch(task: &str, outputs: &[(String, String)], allowlist: &[String]) -> String {
        let aggregated = outputs
            .iter()
            .map(|(name, text)| format!("## {name}\n{text}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let allowed = allowlist
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"Generate a minimal unified git patch for this task.
Only modify files from the allowed list.

# Active Task
{task}

# Agent Outputs
{aggregated}

# Allowed Files
{allowed}

Return only a valid git patch in unified diff format starting with `diff --git`.
No prose."#
        )
    }
}
