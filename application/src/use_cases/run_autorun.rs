//! Run Autorun use case
//!
//! One complete CI invocation: choose the task, resolve the macro and the
//! agents, build the context, run the pipeline, review, derive a patch,
//! optionally apply it, and record governance and procedures.
//!
//! Artifacts are rendered and persisted by the caller from the returned
//! [`AutorunReport`].

use crate::config::{PipelineConfig, TaskMode};
use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::command_runner::CommandRunner;
use crate::ports::generation::GenerationBackend;
use crate::ports::metrics_ledger::MetricsLedger;
use crate::ports::output_cache::OutputCache;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::version_control::VersionControl;
use crate::ports::workspace::{WorkspaceError, WorkspacePort};
use crate::use_cases::apply_patch::{ApplyError, ApplyPatchUseCase};
use crate::use_cases::build_context::{build_context, read_excerpts};
use crate::use_cases::generate::{GenerationClient, GenerationError};
use crate::use_cases::generate_patch::{
    GeneratePatchUseCase, PatchGenerationError, PatchReport, PatchRequest,
};
use crate::use_cases::governance::{
    PROCEDURES_PATH, governance_context, record_directives, record_procedures,
};
use crate::use_cases::guild_review::GuildReviewUseCase;
use crate::use_cases::run_pipeline::{
    AgentMaterial, PipelineError, RunPipelineInput, RunPipelineUseCase,
};
use crate::use_cases::scope::resolve_scope;
use crate::use_cases::self_task::SelfTaskUseCase;
use chrono::{DateTime, Duration, Utc};
use guildhall_domain::pipeline::run_id;
use guildhall_domain::task::{TaskCommand, override_document};
use guildhall_domain::{
    ContextBudget, DomainError, GateRules, GovernanceDirectives, GuildReview, MacroPreset,
    MacroResolution, MacroSchema, MetricsSummary, PipelineRun, Roster, Selection, TaskDocument,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const CURRENT_TASK_PATH: &str = "town/current-task.md";
pub const SHARED_BASE_PATH: &str = "town/base.md";

const DASHBOARD_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum AutorunError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Task document not found: {0}")]
    MissingTask(String),

    #[error("Self-directed task generation failed: {0}")]
    SelfTask(#[source] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Guild review failed: {0}")]
    Review(#[source] GenerationError),

    #[error("Patch generation failed: {0}")]
    Patch(#[from] PatchGenerationError),

    #[error("Working tree restore failed: {0}")]
    Restore(#[from] WorkspaceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    Document,
    SelfDirected,
    Command,
}

impl TaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSource::Document => "main",
            TaskSource::SelfDirected => "self",
            TaskSource::Command => "command",
        }
    }
}

/// Outcome of the optional apply step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    NotRequested,
    /// Apply was requested but there was no diff to apply.
    NoPatch,
    Applied { message: String },
    Rejected {
        message: String,
        guard_log: Option<String>,
    },
}

impl ApplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::NotRequested => "not-requested",
            ApplyStatus::NoPatch => "no-patch",
            ApplyStatus::Applied { .. } => "applied",
            ApplyStatus::Rejected { .. } => "guard-rejected",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApplyStatus::NotRequested => "Auto-apply disabled.",
            ApplyStatus::NoPatch => "No patch to apply.",
            ApplyStatus::Applied { message } | ApplyStatus::Rejected { message, .. } => message,
        }
    }
}

/// Everything the presentation layer needs to render and persist a run.
#[derive(Debug, Clone)]
pub struct AutorunReport {
    pub run: PipelineRun,
    pub started_at: DateTime<Utc>,
    pub task: TaskDocument,
    pub task_source: TaskSource,
    pub task_mode: TaskMode,
    pub task_command: Option<String>,
    pub preset: MacroPreset,
    /// Macro that was asked for but does not exist.
    pub unknown_macro: Option<String>,
    pub selection: Selection,
    pub scope: Vec<String>,
    pub review: Option<GuildReview>,
    pub patch: PatchReport,
    pub auto_apply: bool,
    pub apply: ApplyStatus,
    pub governance: Option<GovernanceDirectives>,
    pub procedures_recorded: Vec<String>,
    pub dashboard: MetricsSummary,
}

impl AutorunReport {
    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }

    pub fn date(&self) -> String {
        self.started_at.format("%Y-%m-%d").to_string()
    }
}

/// Ports the autorun drives.
#[derive(Clone)]
pub struct AutorunPorts {
    pub workspace: Arc<dyn WorkspacePort>,
    pub store: Arc<dyn ArtifactStore>,
    pub cache: Arc<dyn OutputCache>,
    pub ledger: Arc<dyn MetricsLedger>,
    pub vcs: Arc<dyn VersionControl>,
    pub runner: Arc<dyn CommandRunner>,
}

pub struct RunAutorunUseCase<B: GenerationBackend + ?Sized> {
    client: Arc<GenerationClient<B>>,
    ports: AutorunPorts,
    schema: MacroSchema,
    config: PipelineConfig,
}

impl<B: GenerationBackend + ?Sized> RunAutorunUseCase<B> {
    pub fn new(
        backend: Arc<B>,
        ports: AutorunPorts,
        schema: MacroSchema,
        config: PipelineConfig,
    ) -> Self {
        let client = Arc::new(GenerationClient::new(
            backend,
            schema.retry.clone(),
            config.max_prompt_chars,
        ));
        Self {
            client,
            ports,
            schema,
            config,
        }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> Result<AutorunReport, AutorunError> {
        self.execute_with_progress(now, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        now: DateTime<Utc>,
        progress: &dyn ProgressNotifier,
    ) -> Result<AutorunReport, AutorunError> {
        let ports = &self.ports;
        let config = &self.config;

        let resolution = self
            .schema
            .resolve(config.macro_name(), config.max_code_context);
        let unknown_macro = match &resolution {
            MacroResolution::Unknown { requested, .. } => {
                warn!(
                    "Unknown macro '{}'; falling back to agent filters",
                    requested
                );
                Some(requested.clone())
            }
            _ => None,
        };
        let preset = resolution.into_preset();

        let roster = Roster::new(self.schema.roster.clone())?;
        let selection = roster.select(preset.name.as_deref(), &preset.agents, &config.agent_filter)?;
        let names = selection.names();
        info!("Agents: {} ({})", names.join(", "), selection.mode);

        let (task, task_source) = self.load_task(&roster, &preset, &names, progress).await?;
        info!("Task {} from {} source", task.id, task_source.as_str());

        let scope = resolve_scope(&task.text, ports.workspace.as_ref());
        let date = now.format("%Y-%m-%d").to_string();
        let code_context = if selection.is_privileged_solo() {
            info!("Privileged agent running alone: using governance context");
            governance_context(
                ports.store.as_ref(),
                ports.ledger.as_ref(),
                &roster,
                &self.schema.quality_gates,
                now,
            )
            .render()
        } else {
            build_context(
                &scope,
                &task.keywords(),
                ContextBudget::default().with_total_chars(preset.context_chars),
                ports.workspace.as_ref(),
            )
        };

        let input = RunPipelineInput {
            run_id: run_id(now, preset.name.as_deref()),
            gate_rules: GateRules::from_schema(&self.schema, &preset),
            materials: self.materials(&selection),
            shared_base: ports.store.read(SHARED_BASE_PATH).unwrap_or_default(),
            task: task.clone(),
            selection: selection.clone(),
            preset: preset.clone(),
            code_context,
        };
        let pipeline = RunPipelineUseCase::new(
            self.client.clone(),
            ports.workspace.clone(),
            ports.cache.clone(),
            ports.ledger.clone(),
            config.clone(),
        );
        let mut run = pipeline.execute_with_progress(input, progress).await?;

        let excerpts = read_excerpts(&scope, ports.workspace.as_ref());
        let review = GuildReviewUseCase::new(self.client.clone())
            .execute(&mut run, &preset, &task.text, &excerpts, progress)
            .await
            .map_err(AutorunError::Review)?;

        let patch = GeneratePatchUseCase::new(
            self.client.clone(),
            ports.workspace.clone(),
            ports.vcs.clone(),
        )
        .execute(
            PatchRequest {
                run: &run,
                preset: &preset,
                task: &task.text,
                allowlist: &scope,
                source_extensions: &self.schema.quality_gates.source_extensions,
                patch_after_halt: config.patch_after_halt,
            },
            progress,
        )
        .await?;

        let apply = self.apply(&patch, &scope, progress).await?;

        let governance = if selection.is_privileged_solo() {
            match run.completed().next() {
                Some(record) => Some(record_directives(
                    ports.store.as_ref(),
                    record.public_text(),
                    run.run_id(),
                    &date,
                )?),
                None => None,
            }
        } else {
            None
        };
        let procedures_recorded = record_procedures(ports.store.as_ref(), &run, &date, &task.id)?;

        let records = ports.ledger.since(now - Duration::days(DASHBOARD_DAYS));
        let dashboard = MetricsSummary::from_records(&records, DASHBOARD_DAYS);

        Ok(AutorunReport {
            run,
            started_at: now,
            task,
            task_source,
            task_mode: config.task_mode,
            task_command: config.command().map(str::to_string),
            preset,
            unknown_macro,
            selection,
            scope,
            review,
            patch,
            auto_apply: config.auto_apply,
            apply,
            governance,
            procedures_recorded,
            dashboard,
        })
    }

    /// A task command overrides both task modes.
    async fn load_task(
        &self,
        roster: &Roster,
        preset: &MacroPreset,
        names: &[String],
        progress: &dyn ProgressNotifier,
    ) -> Result<(TaskDocument, TaskSource), AutorunError> {
        if let Some(command) = self.config.command() {
            let lead = roster
                .lead()
                .map(|l| l.name.as_str())
                .filter(|l| names.iter().any(|n| n == l));
            let cmd = TaskCommand {
                command,
                macro_name: preset.name.as_deref(),
                default_scope: &self.schema.default_scope,
                agents: names,
                lead,
            };
            if let Some(doc) = override_document(&cmd) {
                return Ok((TaskDocument::parse(doc), TaskSource::Command));
            }
        }

        match self.config.task_mode {
            TaskMode::Main => {
                let text = self
                    .ports
                    .store
                    .read(CURRENT_TASK_PATH)
                    .ok_or_else(|| AutorunError::MissingTask(CURRENT_TASK_PATH.to_string()))?;
                Ok((TaskDocument::parse(text), TaskSource::Document))
            }
            TaskMode::SelfDirected => {
                let task = SelfTaskUseCase::new(
                    self.client.clone(),
                    self.ports.store.clone(),
                    self.config.pipeline_name.clone(),
                )
                .execute(names, progress)
                .await
                .map_err(AutorunError::SelfTask)?;
                Ok((task, TaskSource::SelfDirected))
            }
        }
    }

    /// Persona plus guild doctrine for each selected agent. Missing
    /// documents contribute nothing.
    fn materials(&self, selection: &Selection) -> BTreeMap<String, AgentMaterial> {
        let store = &self.ports.store;
        let procedures = store.read(PROCEDURES_PATH);
        selection
            .agents
            .iter()
            .map(|agent| {
                let mut guild: Vec<String> = agent
                    .guilds
                    .iter()
                    .filter_map(|g| store.read(&format!("guilds/{g}")))
                    .collect();
                guild.extend(procedures.clone());
                let material = AgentMaterial {
                    persona: store.read(&agent.profile).unwrap_or_default(),
                    guild: guild.join("\n\n"),
                };
                (agent.name.clone(), material)
            })
            .collect()
    }

    async fn apply(
        &self,
        patch: &PatchReport,
        scope: &[String],
        progress: &dyn ProgressNotifier,
    ) -> Result<ApplyStatus, AutorunError> {
        if !self.config.auto_apply {
            return Ok(ApplyStatus::NotRequested);
        }
        let Some(diff) = patch.artifact.diff() else {
            return Ok(ApplyStatus::NoPatch);
        };
        let applier = ApplyPatchUseCase::new(
            self.ports.workspace.clone(),
            self.ports.vcs.clone(),
            self.ports.runner.clone(),
            self.config.patch_limits,
        )
        .with_guard_command(self.config.guard_command.clone());

        match applier.execute_with_progress(diff, scope, progress).await {
            Ok(report) => Ok(ApplyStatus::Applied {
                message: report.message(),
            }),
            Err(ApplyError::Workspace(e)) => Err(AutorunError::Restore(e)),
            Err(e) => {
                warn!("Patch not applied: {}", e);
                Ok(ApplyStatus::Rejected {
                    message: e.to_string(),
                    guard_log: e.guard_log().map(str::to_string),
                })
            }
        }
    }
}
