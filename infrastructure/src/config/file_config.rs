//! Raw TOML configuration data types
//!
//! These structs mirror the config file exactly. Environment variables are
//! merged into the same shape by [`ConfigLoader`](super::ConfigLoader), and
//! the composition root converts the result once into an immutable
//! `PipelineConfig`.

use guildhall_application::config::{PatchLimits, PipelineConfig, TaskMode};
use guildhall_domain::AgentFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: FilePathsConfig,
    pub llm: FileLlmConfig,
    pub task: FileTaskConfig,
    pub patch: FilePatchConfig,
    pub context: FileContextConfig,
    pub cache: FileCacheConfig,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// Repository root (`GITHUB_WORKSPACE`)
    pub repo_root: PathBuf,
    /// Agents directory, relative to the repository root
    pub agents_dir: PathBuf,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            agents_dir: PathBuf::from(".github/agents"),
        }
    }
}

/// `[llm]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// `auto`, `openai` or `github`
    pub provider: String,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub github_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            api_url: None,
            model: None,
            api_key: None,
            github_token: None,
            timeout_secs: 180,
        }
    }
}

/// `[task]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTaskConfig {
    /// `main` or `self`
    pub mode: String,
    pub command: Option<String>,
    #[serde(rename = "macro")]
    pub macro_name: Option<String>,
    pub agent_only: Option<String>,
    pub agent_set: Option<String>,
}

/// `[patch]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePatchConfig {
    pub auto_apply: bool,
    pub max_files: usize,
    pub max_lines: usize,
    pub guard_command: Option<String>,
    pub after_halt: bool,
}

impl Default for FilePatchConfig {
    fn default() -> Self {
        let limits = PatchLimits::default();
        Self {
            auto_apply: false,
            max_files: limits.max_files,
            max_lines: limits.max_lines,
            guard_command: None,
            after_halt: true,
        }
    }
}

/// `[context]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContextConfig {
    pub max_code_context: usize,
    pub max_prompt_chars: usize,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            max_code_context: 12_000,
            max_prompt_chars: 60_000,
        }
    }
}

/// `[cache]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub force_rerun: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("task.mode: unknown value '{0}'. Valid values: main, self")]
    InvalidTaskMode(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

impl FileConfig {
    /// Every problem found, not just the first.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        if self.task.mode.parse::<TaskMode>().is_err() {
            errors.push(ConfigValidationError::InvalidTaskMode(self.task.mode.clone()));
        }
        for (field, value) in [
            ("patch.max_files", self.patch.max_files),
            ("patch.max_lines", self.patch.max_lines),
            ("context.max_code_context", self.context.max_code_context),
            ("context.max_prompt_chars", self.context.max_prompt_chars),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::Zero { field });
            }
        }
        errors
    }

    /// Agents directory resolved against the repository root.
    pub fn agents_dir(&self) -> PathBuf {
        self.paths.repo_root.join(&self.paths.agents_dir)
    }

    /// Convert into the run configuration. Call [`validate`](Self::validate)
    /// first; an unparseable task mode falls back to `main` here.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let filter = AgentFilter::from_raw(
            self.task.agent_set.as_deref().unwrap_or_default(),
            self.task.agent_only.as_deref().unwrap_or_default(),
        );
        PipelineConfig {
            task_mode: self.task.mode.parse().unwrap_or_default(),
            task_command: self.task.command.clone(),
            macro_name: self.task.macro_name.clone(),
            agent_filter: filter,
            auto_apply: self.patch.auto_apply,
            patch_limits: PatchLimits {
                max_files: self.patch.max_files,
                max_lines: self.patch.max_lines,
            },
            guard_command: self
                .patch
                .guard_command
                .clone()
                .filter(|c| !c.trim().is_empty()),
            max_code_context: self.context.max_code_context,
            max_prompt_chars: self.context.max_prompt_chars,
            force_rerun: self.cache.force_rerun,
            patch_after_halt: self.patch.after_halt,
            ..PipelineConfig::default()
        }
    }
}
