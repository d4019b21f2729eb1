//! Guild Master governance and procedure recording.
//!
//! The privileged agent never sees source code. It reads the pipeline's own
//! history instead, and its directives are written back to append-only
//! documents that later runs consume.

use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::metrics_ledger::MetricsLedger;
use chrono::{DateTime, Duration, Utc};
use guildhall_domain::governance::{GOVERNANCE_LOG_HEADER, procedure_entry};
use guildhall_domain::{
    GovernanceContext, GovernanceDirectives, MetricsSummary, PipelineRun, QualityGateConfig,
    Roster,
};
use tracing::{debug, info};

pub const PROCEDURES_PATH: &str = "town/procedures.md";
pub const GOVERNANCE_LOG_PATH: &str = "guilds/governance-log.md";
pub const GUILDS_DIR: &str = "guilds";
pub const RUNS_DIR: &str = "runs";

const OBSERVATION_DAYS: i64 = 14;
const RECENT_RECORDS: usize = 30;
const RECENT_REPORTS: usize = 3;

/// Assemble what the Guild Master observes.
pub fn governance_context(
    store: &dyn ArtifactStore,
    ledger: &dyn MetricsLedger,
    roster: &Roster,
    gate: &QualityGateConfig,
    now: DateTime<Utc>,
) -> GovernanceContext {
    let records = ledger.since(now - Duration::days(OBSERVATION_DAYS));
    let metrics_dashboard = (!records.is_empty())
        .then(|| MetricsSummary::from_records(&records, OBSERVATION_DAYS).render_markdown());

    let profiles = roster
        .agents()
        .iter()
        .filter_map(|a| store.read(&a.profile).map(|p| (a.name.clone(), p)))
        .collect();
    let membership = roster
        .agents()
        .iter()
        .filter(|a| !a.privileged)
        .map(|a| (a.name.clone(), a.guilds.clone()))
        .collect();

    let mut guilds: Vec<String> = roster
        .agents()
        .iter()
        .flat_map(|a| a.guilds.iter().cloned())
        .collect();
    guilds.sort();
    guilds.dedup();
    let policies = guilds
        .into_iter()
        .filter_map(|g| {
            store
                .read(&format!("{GUILDS_DIR}/{g}"))
                .map(|policy| (g, policy))
        })
        .collect();

    // run ids start with the date, so name order is age order
    let mut reports = store.list(RUNS_DIR, ".md");
    reports.retain(|name| !name.ends_with(".full.md"));
    let recent_reports = reports
        .iter()
        .rev()
        .take(RECENT_REPORTS)
        .filter_map(|name| {
            store
                .read(&format!("{RUNS_DIR}/{name}"))
                .map(|r| (name.clone(), r))
        })
        .collect();

    let context = GovernanceContext {
        metrics_dashboard,
        recent_records: ledger.tail(RECENT_RECORDS),
        profiles,
        membership,
        policies,
        procedures: store.read(PROCEDURES_PATH).unwrap_or_default(),
        gate: gate.clone(),
        governance_log: store.read(GOVERNANCE_LOG_PATH),
        recent_reports,
    };
    debug!(
        "Governance context: {} records, {} reports",
        records.len(),
        context.recent_reports.len()
    );
    context
}

/// Persist the directives in `output`.
///
/// The governance log is created with its header on first use. Policy
/// directives are mirrored into the procedures document.
pub fn record_directives(
    store: &dyn ArtifactStore,
    output: &str,
    run_id: &str,
    date: &str,
) -> Result<GovernanceDirectives, StoreError> {
    let directives = GovernanceDirectives::extract(output);
    if let Some(entry) = directives.log_entry(run_id, date) {
        if !store.exists(GOVERNANCE_LOG_PATH) {
            store.write(GOVERNANCE_LOG_PATH, GOVERNANCE_LOG_HEADER)?;
        }
        store.append(GOVERNANCE_LOG_PATH, &entry)?;
    }
    if let Some(entry) = directives.procedures_entry(run_id, date) {
        store.append(PROCEDURES_PATH, &entry)?;
    }
    info!("{}", directives.summary());
    Ok(directives)
}

/// Append each completed agent's procedure recording. Returns the agents
/// whose procedures were recorded.
pub fn record_procedures(
    store: &dyn ArtifactStore,
    run: &PipelineRun,
    date: &str,
    task_id: &str,
) -> Result<Vec<String>, StoreError> {
    let mut recorded = Vec::new();
    for record in run.completed() {
        let Some(procedure) = &record.fields.procedure else {
            continue;
        };
        store.append(
            PROCEDURES_PATH,
            &procedure_entry(&record.agent, date, task_id, procedure),
        )?;
        recorded.push(record.agent.clone());
    }
    if !recorded.is_empty() {
        info!("Recorded procedures from: {}", recorded.join(", "));
    }
    Ok(recorded)
}
