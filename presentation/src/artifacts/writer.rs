use crate::report::{NextTask, render_full_log, render_next_task, render_proposal, render_report};
use guildhall_application::{ApplyStatus, ArtifactStore, AutorunReport, StoreError};
use tracing::info;

pub const RUNS_DIR: &str = "runs";
pub const PROPOSALS_DIR: &str = "proposals";
pub const NEXT_TASK_PATH: &str = "town/next-task.md";

/// Display paths of everything written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub run_report: String,
    pub full_log: String,
    pub code_proposal: String,
    pub patch_proposal: String,
    pub guard_log: Option<String>,
    pub next_task: Option<String>,
}

/// Writes the report, full log, proposal, patch, guard log and next-task
/// file for a finished run.
pub struct ArtifactWriter<'a> {
    store: &'a dyn ArtifactStore,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(store: &'a dyn ArtifactStore) -> Self {
        Self { store }
    }

    /// `<date>-<task>` with the task id lowercased and made path-safe.
    fn proposal_stem(report: &AutorunReport) -> String {
        let task: String = report
            .task
            .id
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        format!("{}-{}", report.date(), task)
    }

    pub fn persist(&self, report: &AutorunReport) -> Result<ArtifactPaths, StoreError> {
        let run_id = report.run_id();
        let stem = Self::proposal_stem(report);

        let run_report = format!("{RUNS_DIR}/{run_id}.md");
        let full_log = format!("{RUNS_DIR}/{run_id}.full.md");
        let code_proposal = format!("{PROPOSALS_DIR}/{stem}-proposal.md");
        let patch_proposal = format!("{PROPOSALS_DIR}/{stem}-proposal.patch");

        self.store.write(&run_report, &render_report(report))?;
        self.store.write(&full_log, &render_full_log(report))?;
        self.store.write(&code_proposal, &render_proposal(report))?;
        self.store
            .write(&patch_proposal, &report.patch.artifact.file_text())?;

        let guard_log = match &report.apply {
            ApplyStatus::Rejected {
                guard_log: Some(log),
                ..
            } => {
                let path = format!("{PROPOSALS_DIR}/{stem}-guard.log");
                self.store.write(&path, log)?;
                Some(path)
            }
            _ => None,
        };

        let next_task = match render_next_task(report) {
            NextTask::Recommend(text) => {
                self.store.write(NEXT_TASK_PATH, &text)?;
                info!("Next-task recommendations written");
                Some(NEXT_TASK_PATH.to_string())
            }
            NextTask::Clear(text) if self.store.exists(NEXT_TASK_PATH) => {
                self.store.write(NEXT_TASK_PATH, &text)?;
                Some(NEXT_TASK_PATH.to_string())
            }
            NextTask::Clear(_) => None,
        };

        info!("Run report written to {}", self.store.display_path(&run_report));

        let display = |p: &str| self.store.display_path(p);
        Ok(ArtifactPaths {
            run_report: display(&run_report),
            full_log: display(&full_log),
            code_proposal: display(&code_proposal),
            patch_proposal: display(&patch_proposal),
            guard_log: guard_log.as_deref().map(display),
            next_task: next_task.as_deref().map(display),
        })
    }
}
