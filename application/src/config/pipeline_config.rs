//! Pipeline configuration, built once at startup.
//!
//! [`PipelineConfig`] is the only place run-wide knobs live. It is
//! constructed by the composition root from file + environment sources and
//! then passed by reference into every use case; nothing below the root
//! reads the environment.

use guildhall_domain::{AgentFilter, PromptLimits};
use serde::{Deserialize, Serialize};

/// Where the task text comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    /// `town/current-task.md`
    #[default]
    Main,
    /// Generated from the town README and schedule.
    #[serde(rename = "self")]
    SelfDirected,
}

impl TaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskMode::Main => "main",
            TaskMode::SelfDirected => "self",
        }
    }
}

impl std::fmt::Display for TaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "main" => Ok(TaskMode::Main),
            "self" => Ok(TaskMode::SelfDirected),
            other => Err(format!("Unknown task mode '{other}'. Valid values: main, self")),
        }
    }
}

/// Size limits enforced by the guarded applier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLimits {
    pub max_files: usize,
    pub max_lines: usize,
}

impl Default for PatchLimits {
    fn default() -> Self {
        Self {
            max_files: 8,
            max_lines: 400,
        }
    }
}

/// Immutable run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Name the agents are told they run inside.
    pub pipeline_name: String,
    pub task_mode: TaskMode,
    pub task_command: Option<String>,
    pub macro_name: Option<String>,
    pub agent_filter: AgentFilter,
    pub auto_apply: bool,
    pub patch_limits: PatchLimits,
    pub guard_command: Option<String>,
    /// Default code-context budget when the macro sets none.
    pub max_code_context: usize,
    pub max_prompt_chars: usize,
    pub force_rerun: bool,
    /// Whether patch generation and application still run after a HALT.
    pub patch_after_halt: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline_name: "guildhall".to_string(),
            task_mode: TaskMode::Main,
            task_command: None,
            macro_name: None,
            agent_filter: AgentFilter::default(),
            auto_apply: false,
            patch_limits: PatchLimits::default(),
            guard_command: None,
            max_code_context: 12_000,
            max_prompt_chars: 60_000,
            force_rerun: false,
            patch_after_halt: true,
        }
    }
}

impl PipelineConfig {
    /// Prompt limits derived from the configured ceiling.
    pub fn prompt_limits(&self) -> PromptLimits {
        PromptLimits {
            ceiling: self.max_prompt_chars,
            ..PromptLimits::default()
        }
    }

    /// Blank strings count as unset.
    pub fn command(&self) -> Option<&str> {
        self.task_command.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn macro_name(&self) -> Option<&str> {
        self.macro_name.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    // ==================== Builder Methods ====================

    pub fn with_macro(mut self, name: impl Into<String>) -> Self {
        self.macro_name = Some(name.into());
        self
    }

    pub fn with_task_command(mut self, command: impl Into<String>) -> Self {
        self.task_command = Some(command.into());
        self
    }

    pub fn with_agent_filter(mut self, filter: AgentFilter) -> Self {
        self.agent_filter = filter;
        self
    }

    pub fn with_auto_apply(mut self, enabled: bool) -> Self {
        self.auto_apply = enabled;
        self
    }

    pub fn with_patch_limits(mut self, limits: PatchLimits) -> Self {
        self.patch_limits = limits;
        self
    }

    pub fn with_guard_command(mut self, command: impl Into<String>) -> Self {
        self.guard_command = Some(command.into());
        self
    }

    pub fn with_force_rerun(mut self, force: bool) -> Self {
        self.force_rerun = force;
        self
    }

    pub fn with_patch_after_halt(mut self, enabled: bool) -> Self {
        self.patch_after_halt = enabled;
        self
    }
}
