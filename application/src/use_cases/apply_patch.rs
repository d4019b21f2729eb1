//! Apply Patch use case
//!
//! The guarded applier. A patch lands in the working tree only when every
//! check passes; any failure leaves the touched files exactly as they were.

use crate::config::PatchLimits;
use crate::ports::command_runner::CommandRunner;
use crate::ports::progress::{ProgressNotifier, Stage};
use crate::ports::version_control::{VcsError, VersionControl};
use crate::ports::workspace::{WorkspaceError, WorkspacePort};
use crate::use_cases::generate_patch::restore;
use guildhall_domain::DiffStat;
use guildhall_domain::patch::{changed_files, parse_numstat};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Patch touches no files")]
    NoFiles,

    #[error("Patch touches disallowed files: {}", .0.join(", "))]
    DisallowedFiles(Vec<String>),

    #[error("Patch touches {count} files (max {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("git apply failed: {0}")]
    ApplyFailed(#[from] VcsError),

    #[error("Patch too large after apply ({stat}); limits are files={max_files}, lines={max_lines}")]
    TooLarge {
        stat: DiffStat,
        max_files: usize,
        max_lines: usize,
    },

    #[error("Guard command failed: {command}")]
    GuardFailed { command: String, output: String },

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl ApplyError {
    /// Output of a failed guard command, kept as a run artifact.
    pub fn guard_log(&self) -> Option<&str> {
        match self {
            ApplyError::GuardFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub stat: DiffStat,
    pub files: Vec<String>,
}

impl ApplyReport {
    pub fn message(&self) -> String {
        format!("Patch applied. {}", self.stat)
    }
}

pub struct ApplyPatchUseCase {
    workspace: Arc<dyn WorkspacePort>,
    vcs: Arc<dyn VersionControl>,
    runner: Arc<dyn CommandRunner>,
    limits: PatchLimits,
    guard_command: Option<String>,
}

impl ApplyPatchUseCase {
    pub fn new(
        workspace: Arc<dyn WorkspacePort>,
        vcs: Arc<dyn VersionControl>,
        runner: Arc<dyn CommandRunner>,
        limits: PatchLimits,
    ) -> Self {
        Self {
            workspace,
            vcs,
            runner,
            limits,
            guard_command: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_guard_command(mut self, command: Option<String>) -> Self {
        self.guard_command = command.filter(|c| !c.trim().is_empty());
        self
    }

    pub async fn execute(&self, diff: &str, allowlist: &[String]) -> Result<ApplyReport, ApplyError> {
        self.execute_with_progress(diff, allowlist, &crate::ports::progress::NoProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        diff: &str,
        allowlist: &[String],
        progress: &dyn ProgressNotifier,
    ) -> Result<ApplyReport, ApplyError> {
        let files = self.touched_files(diff).await?;
        self.precheck(&files, allowlist)?;

        progress.on_stage_start(Stage::Apply, files.len());
        let mut snapshot: BTreeMap<String, Option<String>> = BTreeMap::new();
        for file in &files {
            snapshot.insert(file.clone(), self.workspace.read(file)?);
        }

        let result = self.apply_checked(diff, &files).await;
        if let Err(e) = &result {
            warn!("Reverting patch: {}", e);
            restore(self.workspace.as_ref(), &snapshot)?;
        }
        progress.on_stage_complete(Stage::Apply);
        result
    }

    /// Paths named in the diff text plus any path git reports on its own,
    /// so a header the diff reader misses still reaches the allowlist.
    async fn touched_files(&self, diff: &str) -> Result<Vec<String>, ApplyError> {
        let mut files = changed_files(diff);
        if files.is_empty() {
            return Err(ApplyError::NoFiles);
        }
        for path in self.vcs.patch_paths(diff).await? {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Checks that need no side effects.
    fn precheck(&self, files: &[String], allowlist: &[String]) -> Result<(), ApplyError> {
        if files.is_empty() {
            return Err(ApplyError::NoFiles);
        }
        let disallowed: Vec<String> = files
            .iter()
            .filter(|f| !allowlist.contains(f))
            .cloned()
            .collect();
        if !disallowed.is_empty() {
            return Err(ApplyError::DisallowedFiles(disallowed));
        }
        if files.len() > self.limits.max_files {
            return Err(ApplyError::TooManyFiles {
                count: files.len(),
                max: self.limits.max_files,
            });
        }
        Ok(())
    }

    async fn apply_checked(&self, diff: &str, files: &[String]) -> Result<ApplyReport, ApplyError> {
        self.vcs.apply(diff).await?;

        let stat = parse_numstat(&self.vcs.numstat(files).await?);
        if stat.files > self.limits.max_files || stat.changed_lines() > self.limits.max_lines {
            return Err(ApplyError::TooLarge {
                stat,
                max_files: self.limits.max_files,
                max_lines: self.limits.max_lines,
            });
        }

        if let Some(command) = &self.guard_command {
            info!("Running guard command: {}", command);
            let output = self.runner.run(command).await;
            if !output.success() {
                return Err(ApplyError::GuardFailed {
                    command: command.clone(),
                    output: output.output,
                });
            }
        }

        info!("Patch applied: {}", stat);
        Ok(ApplyReport {
            stat,
            files: files.to_vec(),
        })
    }
}
