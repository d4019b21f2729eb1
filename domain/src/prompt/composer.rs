//! Per-agent prompt composition with a hard size ceiling.
//!
//! Sections appear in a fixed order. When the composed prompt exceeds the
//! ceiling, sections are trimmed in priority order:
//!
//! 1. code context, down to its floor
//! 2. prior agent outputs, down to their floor
//! 3. guild doctrine, handoff notes, code context, and prior outputs are
//!    cut to markers
//!
//! Shared rules, persona, directive, task text, and the output contract
//! are never trimmed.

use crate::core::string::{prefix, suffix};

const CODE_TRIMMED: &str = "\n... [code context trimmed to fit prompt ceiling] ...";
const PRIOR_TRIMMED: &str = "... [earlier output trimmed to fit prompt ceiling] ...\n";
const DROPPED: &str = "... [dropped to fit prompt ceiling] ...";

/// Cap on the guild doctrine section.
pub const GUILD_CHARS: usize = 3000;

/// Size limits applied during composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub ceiling: usize,
    pub code_floor: usize,
    pub prior_floor: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            ceiling: 60_000,
            code_floor: 2_000,
            prior_floor: 1_000,
        }
    }
}

/// Everything that goes into one agent prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPromptInput {
    pub pipeline_name: String,
    pub shared_base: String,
    pub persona: String,
    pub guild: String,
    pub directive: Option<String>,
    pub task: String,
    pub agent: String,
    pub handoff: String,
    pub code_context: String,
    /// `(agent, output)` pairs in execution order.
    pub prior_outputs: Vec<(String, String)>,
    /// Cap applied to the handoff and to each prior output.
    pub handoff_chars: usize,
    pub contract: String,
}

/// Which trimming steps ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStep {
    CodeContext,
    PriorOutputs,
    HardTruncate,
}

/// A composed prompt and how it was fitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub text: String,
    pub trims: Vec<TrimStep>,
    /// Still above the ceiling after every step; only untrimmable
    /// sections remain.
    pub over_ceiling: bool,
}

/// Mutable section texts during fitting.
struct Parts {
    guild: String,
    handoff: String,
    code: String,
    prior: String,
}

fn render(input: &AgentPromptInput, parts: &Parts) -> String {
    let mut out = format!(
        "You are running inside the {} multi-agent pipeline.\n\n# Shared Base\n{}\n\n# Agent Profile\n{}\n",
        input.pipeline_name, input.shared_base, input.persona
    );
    if !parts.guild.is_empty() {
        out.push_str(&format!(
            "\n# Guild Context (shared procedures and vocabulary)\n{}\n",
            parts.guild
        ));
    }
    if let Some(directive) = input.directive.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(
            "\n# Macro Directive (FOLLOW THIS: it overrides the default output format)\n{directive}\n"
        ));
    }
    out.push_str(&format!(
        "\n# Active Task\n{}\n\n# Incoming Handoff TODOs for {}\n{}\n\n# Relevant Code Context\n{}\n\n# Previous Agent Outputs\n{}\n\n{}",
        input.task,
        input.agent,
        parts.handoff,
        parts.code,
        if parts.prior.is_empty() { "None" } else { &parts.prior },
        input.contract
    ));
    out.trim().to_string()
}

fn prior_section(outputs: &[(String, String)], cap: usize) -> String {
    outputs
        .iter()
        .map(|(name, text)| format!("## {name} Output\n{}", prefix(text, cap)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compose and fit one agent prompt.
pub fn compose(input: &AgentPromptInput, limits: PromptLimits) -> ComposedPrompt {
    let mut parts = Parts {
        guild: prefix(&input.guild, GUILD_CHARS).to_string(),
        handoff: prefix(&input.handoff, input.handoff_chars).to_string(),
        code: input.code_context.clone(),
        prior: prior_section(&input.prior_outputs, input.handoff_chars),
    };
    let mut trims = Vec::new();
    let mut text = render(input, &parts);

    let excess = |text: &str| text.len().saturating_sub(limits.ceiling);

    if excess(&text) > 0 && parts.code.len() > limits.code_floor {
        let target = parts
            .code
            .len()
            .saturating_sub(excess(&text) + CODE_TRIMMED.len())
            .max(limits.code_floor);
        parts.code = format!("{}{}", prefix(&parts.code, target), CODE_TRIMMED);
        trims.push(TrimStep::CodeContext);
        text = render(input, &parts);
    }

    if excess(&text) > 0 && parts.prior.len() > limits.prior_floor {
        // the most recent outputs sit at the end and are kept
        let target = parts
            .prior
            .len()
            .saturating_sub(excess(&text) + PRIOR_TRIMMED.len())
            .max(limits.prior_floor);
        parts.prior = format!("{}{}", PRIOR_TRIMMED, suffix(&parts.prior, target));
        trims.push(TrimStep::PriorOutputs);
        text = render(input, &parts);
    }

    if excess(&text) > 0 {
        parts.guild.clear();
        parts.handoff = DROPPED.to_string();
        parts.code = DROPPED.to_string();
        if !parts.prior.is_empty() {
            parts.prior = DROPPED.to_string();
        }
        trims.push(TrimStep::HardTruncate);
        text = render(input, &parts);
    }

    ComposedPrompt {
        over_ceiling: excess(&text) > 0,
        text,
        trims,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AgentPromptInput {
        AgentPromptInput {
            pipeline_name: "guildhall".to_string(),
            shared_base: "Be precise.".to_string(),
            persona: "You are the Vulkan Guru.".to_string(),
            guild: "Measure before optimizing.".to_string(),
            directive: Some("Only review barriers.".to_string()),
            task: "## Task ID\nGEN-1\nFix barriers.".to_string(),
            agent: "Vulkan Guru".to_string(),
            handoff: "Vulkan Guru TODOs:\n- check sync".to_string(),
            code_context: "## src/a.cpp\nint main() {}".to_string(),
            prior_outputs: vec![("C++ Lead".to_string(), "Lead says hi".to_string())],
            handoff_chars: 1500,
            contract: "Return markdown with these exact sections:\n1) Main".to_string(),
        }
    }

    // ==================== Layout Tests ====================

    #[test]
    fn test_section_order() {
        let prompt = compose(&input(), PromptLimits::default());
        let text = &prompt.text;
        let order = [
            "You are running inside the guildhall multi-agent pipeline.",
            "# Shared Base",
            "# Agent Profile",
            "# Guild Context",
            "# Macro Directive",
            "# Active Task",
            "# Incoming Handoff TODOs for Vulkan Guru",
            "# Relevant Code Context",
            "# Previous Agent Outputs\n## C++ Lead Output\nLead says hi",
            "Return markdown with these exact sections:",
        ];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.trims.is_empty());
        assert!(!prompt.over_ceiling);
    }

    #[test]
    fn test_optional_sections_omitted() {
        let mut i = input();
        i.guild.clear();
        i.directive = None;
        i.prior_outputs.clear();
        let text = compose(&i, PromptLimits::default()).text;
        assert!(!text.contains("# Guild Context"));
        assert!(!text.contains("# Macro Directive"));
        assert!(text.contains("# Previous Agent Outputs\nNone"));
    }

    #[test]
    fn test_prior_outputs_individually_capped() {
        let mut i = input();
        i.handoff_chars = 5;
        i.prior_outputs = vec![("A".to_string(), "0123456789".to_string())];
        let text = compose(&i, PromptLimits::default()).text;
        assert!(text.contains("## A Output\n01234\n"));
        assert!(!text.contains("0123456789"));
    }

    // ==================== Ceiling Tests ====================

    #[test]
    fn test_code_context_trimmed_first() {
        let mut i = input();
        i.code_context = "c".repeat(10_000);
        i.prior_outputs = vec![("Lead".to_string(), "p".repeat(1_400))];
        let limits = PromptLimits {
            ceiling: 6_000,
            code_floor: 1_000,
            prior_floor: 500,
        };
        let prompt = compose(&i, limits);
        assert_eq!(prompt.trims, vec![TrimStep::CodeContext]);
        assert!(prompt.text.len() <= 6_000);
        assert!(prompt.text.contains(CODE_TRIMMED));
        assert!(prompt.text.contains(&"p".repeat(1_400)));
    }

    #[test]
    fn test_prior_outputs_trimmed_after_code_floor() {
        let mut i = input();
        i.code_context = "c".repeat(3_000);
        i.handoff_chars = 10_000;
        i.prior_outputs = vec![
            ("Old".to_string(), "o".repeat(4_000)),
            ("New".to_string(), "n".repeat(2_000)),
        ];
        let limits = PromptLimits {
            ceiling: 5_000,
            code_floor: 2_000,
            prior_floor: 500,
        };
        let prompt = compose(&i, limits);
        assert_eq!(prompt.trims, vec![TrimStep::CodeContext, TrimStep::PriorOutputs]);
        assert!(prompt.text.len() <= 5_000);
        assert!(prompt.text.contains(&"n".repeat(2_000)));
        assert!(prompt.text.contains(PRIOR_TRIMMED));
    }

    #[test]
    fn test_hard_truncate_keeps_task_and_contract() {
        let mut i = input();
        i.code_context = "c".repeat(3_000);
        i.guild = "g".repeat(3_000);
        let limits = PromptLimits {
            ceiling: 800,
            code_floor: 2_500,
            prior_floor: 500,
        };
        let prompt = compose(&i, limits);
        assert!(prompt.trims.contains(&TrimStep::HardTruncate));
        assert!(prompt.text.contains("Fix barriers."));
        assert!(prompt.text.contains("Return markdown with these exact sections:"));
        assert!(!prompt.text.contains("ggg"));
        assert!(!prompt.over_ceiling);
    }

    #[test]
    fn test_over_ceiling_reported_when_task_alone_is_too_big() {
        let mut i = input();
        i.task = "t".repeat(2_000);
        let limits = PromptLimits {
            ceiling: 1_000,
            ..PromptLimits::default()
        };
        let prompt = compose(&i, limits);
        assert!(prompt.over_ceiling);
        assert!(prompt.text.contains(&"t".repeat(2_000)));
    }
}
