//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What is printed to stdout when the run finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable run summary
    Json,
    /// Colored human summary
    Console,
    /// Console summary followed by the JSON summary
    Both,
}

impl OutputFormat {
    pub fn wants_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn wants_console(&self) -> bool {
        matches!(self, OutputFormat::Console | OutputFormat::Both)
    }
}

/// CLI arguments for guildhall
#[derive(Parser, Debug)]
#[command(name = "guildhall")]
#[command(author, version, about = "CI-embedded multi-agent review and patch pipeline")]
#[command(long_about = r#"
Guildhall runs a party of specialist agents over one repository task.

Each run goes through these stages:
1. Agents: the roster runs in order, every output checked by the quality gate
2. Guild review: optional API-hallucination check of the combined proposals
3. Patch: proposals are turned into a unified diff restricted to the task scope
4. Apply: optional guarded apply with size limits and a build guard

Configuration is loaded from (highest priority first):
1. Environment variables (LLM_MODEL, MACRO_MODE, TASK_COMMAND, ...)
2. --config <path>     Explicit config file
3. ./guildhall.toml    Project-level config
4. ~/.config/guildhall/config.toml   Global config

Example:
  guildhall
  guildhall --macro charge --task-command "wire the descriptor pool"
  guildhall --agent "Vulkan Guru" --auto-apply --output console
"#)]
pub struct Cli {
    /// Macro preset to run (overrides MACRO_MODE)
    #[arg(short, long = "macro", value_name = "NAME")]
    pub macro_name: Option<String>,

    /// Free-text task that replaces the task document
    #[arg(short, long, value_name = "TEXT")]
    pub task_command: Option<String>,

    /// Run a single agent (name or alias)
    #[arg(short, long, value_name = "AGENT")]
    pub agent: Option<String>,

    /// Comma-separated subset of agents
    #[arg(long, value_name = "AGENTS")]
    pub agent_set: Option<String>,

    /// Task source: main or self
    #[arg(long, value_name = "MODE")]
    pub task_mode: Option<String>,

    /// Apply the generated patch behind the guard
    #[arg(long)]
    pub auto_apply: bool,

    /// Ignore cached agent outputs
    #[arg(long)]
    pub force_rerun: bool,

    /// Repository root (defaults to GITHUB_WORKSPACE or the current directory)
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Exit with status 1 when the pipeline halts
    #[arg(long)]
    pub fail_on_halt: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
