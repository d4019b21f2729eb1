//! Machine-readable run summary printed to stdout.

use crate::artifacts::ArtifactPaths;
use guildhall_application::AutorunReport;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub task: String,
    pub macro_mode: String,
    pub task_command: String,
    pub task_mode: String,
    pub task_source: String,
    pub agent_mode: String,
    pub run_report: String,
    pub full_log: String,
    pub code_proposal: String,
    pub patch_proposal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_task: Option<String>,
    pub patch_status: String,
    pub auto_apply_patch: bool,
    pub apply_status: String,
    pub apply_message: String,
    pub pipeline_halted: bool,
    pub halt_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_review: Option<String>,
    pub allowed_scope_files: Vec<String>,
    pub agents: Vec<String>,
}

impl RunSummary {
    pub fn new(report: &AutorunReport, paths: &ArtifactPaths) -> Self {
        Self {
            run_id: report.run_id().to_string(),
            task: report.task.id.clone(),
            macro_mode: report.preset.name.clone().unwrap_or_else(|| "none".to_string()),
            task_command: report.task_command.clone().unwrap_or_default(),
            task_mode: report.task_mode.to_string(),
            task_source: report.task_source.as_str().to_string(),
            agent_mode: report.selection.mode.to_string(),
            run_report: paths.run_report.clone(),
            full_log: paths.full_log.clone(),
            code_proposal: paths.code_proposal.clone(),
            patch_proposal: paths.patch_proposal.clone(),
            guard_log: paths.guard_log.clone(),
            next_task: paths.next_task.clone(),
            patch_status: report.patch.artifact.status().to_string(),
            auto_apply_patch: report.auto_apply,
            apply_status: report.apply.as_str().to_string(),
            apply_message: report.apply.message().to_string(),
            pipeline_halted: report.run.is_halted(),
            halt_message: report
                .run
                .halt_reason()
                .map(|h| h.to_string())
                .unwrap_or_default(),
            guild_review: report.review.as_ref().map(|r| r.verdict.to_string()),
            allowed_scope_files: report.scope.clone(),
            agents: report.selection.names(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
