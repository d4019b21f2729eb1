//! CLI entrypoint for guildhall
//!
//! This is the main binary that wires together all layers using
//! dependency injection. It is the only place that reads the environment
//! and the only place that turns an error into an exit code.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use guildhall_application::{
    AutorunPorts, AutorunReport, NoProgress, ProgressNotifier, RunAutorunUseCase,
};
use guildhall_infrastructure::{
    BackendSettings, ChatCompletionsBackend, ConfigLoader, FileConfig, FsArtifactStore,
    FsOutputCache, GitCli, JsonlMetricsLedger, LocalWorkspace, SchemaLoader, ShellCommandRunner,
};
use guildhall_presentation::{
    ArtifactWriter, Cli, ConsoleFormatter, ProgressReporter, RunSummary, SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// CLI flags win over environment and config files.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(root) = &cli.repo_root {
        config.paths.repo_root = root.clone();
    }
    if let Some(name) = &cli.macro_name {
        config.task.macro_name = Some(name.clone());
    }
    if let Some(command) = &cli.task_command {
        config.task.command = Some(command.clone());
    }
    if let Some(agent) = &cli.agent {
        config.task.agent_only = Some(agent.clone());
    }
    if let Some(set) = &cli.agent_set {
        config.task.agent_set = Some(set.clone());
    }
    if let Some(mode) = &cli.task_mode {
        config.task.mode = mode.clone();
    }
    if cli.auto_apply {
        config.patch.auto_apply = true;
    }
    if cli.force_rerun {
        config.cache.force_rerun = true;
    }
}

/// Stderr plus a daily-rotated file under `<agents_dir>/runs`.
fn init_tracing(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let log_dir = config.agents_dir().join("runs");
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "guildhall.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn progress_for(cli: &Cli) -> Box<dyn ProgressNotifier> {
    if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut file_config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    apply_overrides(&cli, &mut file_config);

    let _log_guard = init_tracing(cli.verbose, &file_config);
    info!("Starting guildhall");

    let problems = file_config.validate();
    if !problems.is_empty() {
        let list: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
        bail!("Invalid configuration: {}", list.join("; "));
    }

    let repo_root = file_config.paths.repo_root.clone();
    let agents_dir = file_config.agents_dir();
    let schema = SchemaLoader::load(&agents_dir).context("Failed to load macro schema")?;
    let config = file_config.to_pipeline_config();

    // === Dependency Injection ===
    let settings = BackendSettings::resolve(&file_config.llm)?;
    info!("Using {:?} backend with model {}", settings.kind, settings.model);
    let backend = Arc::new(ChatCompletionsBackend::new(settings)?);

    let store = Arc::new(
        FsArtifactStore::new(&agents_dir).with_display_prefix(&file_config.paths.agents_dir),
    );
    let ports = AutorunPorts {
        workspace: Arc::new(LocalWorkspace::new(&repo_root)),
        store: store.clone(),
        cache: Arc::new(FsOutputCache::in_agents_dir(&agents_dir)),
        ledger: Arc::new(JsonlMetricsLedger::in_agents_dir(&agents_dir)),
        vcs: Arc::new(GitCli::new(&repo_root)),
        runner: Arc::new(ShellCommandRunner::new(&repo_root)),
    };

    let use_case = RunAutorunUseCase::new(backend, ports, schema, config);
    let progress = progress_for(&cli);
    let report: AutorunReport = use_case
        .execute_with_progress(chrono::Utc::now(), progress.as_ref())
        .await?;

    let paths = ArtifactWriter::new(store.as_ref())
        .persist(&report)
        .context("Failed to write run artifacts")?;

    if cli.output.wants_console() {
        println!("{}", ConsoleFormatter::format(&report, &paths));
    }
    if cli.output.wants_json() {
        println!("{}", RunSummary::new(&report, &paths).to_json());
    }

    if let Some(reason) = report.run.halt_reason() {
        warn!("Pipeline halted: {}", reason);
        if cli.fail_on_halt {
            return Ok(ExitCode::from(1));
        }
    }
    Ok(ExitCode::SUCCESS)
}
