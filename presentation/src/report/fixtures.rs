//! Sample run reports shared by the renderer tests.

use chrono::{DateTime, Utc};
use guildhall_application::{
    ApplyStatus, AutorunReport, PatchArtifact, PatchReport, PatchSource, TaskMode, TaskSource,
};
use guildhall_domain::{
    AgentOutcome, AgentOutputRecord, AgentSpec, Confidence, Fingerprint, GateReport, GateVerdict,
    HaltReason, HaltSource, MacroSchema, MarkerCounts, MetricsSummary, OutputFields, PipelineRun,
    ReasoningSplit, Selection, SelectionMode, TaskDocument,
};

pub const DIFF: &str = "diff --git a/src/pool.cpp b/src/pool.cpp\n--- a/src/pool.cpp\n+++ b/src/pool.cpp\n@@ -1 +1 @@\n-int pool;\n+int pool = 0;\n";

pub fn started_at() -> DateTime<Utc> {
    "2026-03-01T10:20:30Z".parse().unwrap()
}

pub fn record(agent: &str, public: &str, next_run: Option<&str>) -> AgentOutputRecord {
    AgentOutputRecord {
        agent: agent.to_string(),
        raw: format!("<reasoning>thinking about {agent}</reasoning>\n{public}"),
        split: ReasoningSplit {
            public: public.to_string(),
            reasoning: format!("thinking about {agent}"),
        },
        fields: OutputFields {
            todos: vec!["src/pool.cpp:1 initialise pool (risk: UB)".to_string()],
            code_proposal: Some(format!("```cpp\n// {agent}\nint pool = 0;\n```")),
            next_run: next_run.map(String::from),
            procedure: None,
            confidence: Confidence::High,
            markers: MarkerCounts::default(),
        },
        gate: GateReport {
            verdict: GateVerdict::Pass,
            message: "ok".to_string(),
            sections_found: 9,
            markers: MarkerCounts::default(),
            confidence: Confidence::High,
            invalid_file_refs: Vec::new(),
        },
        fingerprint: Fingerprint::compute("task", "ctx", agent, "charge"),
        cache_hit: false,
        truncated: false,
        latency_ms: 1500,
        prompt_chars: 4200,
        attempts: 1,
    }
}

/// Two-agent charge run that produced a patch.
pub fn report() -> AutorunReport {
    let mut run = PipelineRun::new("2026-03-01-charge-102030");
    run.record(AgentOutcome::Completed(Box::new(record(
        "C++ Lead",
        "1) Main Task Outcome\nPool is uninitialised.",
        Some("`Follow \"wire pool\"` to finish the wiring."),
    ))));
    run.record(AgentOutcome::Completed(Box::new(record(
        "Vulkan Guru",
        "1) Main Task Outcome\nBarriers look right.",
        None,
    ))));

    let preset = MacroSchema::default().base_preset(12_000);
    AutorunReport {
        run,
        started_at: started_at(),
        task: TaskDocument::parse("## Task ID\nGEN-7\n\nInitialise the pool."),
        task_source: TaskSource::Document,
        task_mode: TaskMode::Main,
        task_command: None,
        preset: guildhall_domain::MacroPreset {
            name: Some("charge".to_string()),
            ..preset
        },
        unknown_macro: None,
        selection: Selection {
            agents: vec![
                AgentSpec::new("C++ Lead", "party/lead.md").as_lead(),
                AgentSpec::new("Vulkan Guru", "party/guru.md"),
            ],
            mode: SelectionMode::Macro("charge".to_string()),
        },
        scope: vec!["src/pool.cpp".to_string(), "src/pool.h".to_string()],
        review: None,
        patch: PatchReport {
            artifact: PatchArtifact::Produced {
                diff: DIFF.to_string(),
                source: PatchSource::Legacy,
                files: vec!["src/pool.cpp".to_string()],
            },
            blocks_parsed: 0,
            blocks_applied: 0,
            block_errors: Vec::new(),
        },
        auto_apply: false,
        apply: ApplyStatus::NotRequested,
        governance: None,
        procedures_recorded: Vec::new(),
        dashboard: MetricsSummary::default(),
    }
}

/// Same run, halted by the lead's gate before the second agent.
pub fn halted_report() -> AutorunReport {
    let mut report = report();
    let mut run = PipelineRun::new("2026-03-01-charge-102030");
    let mut lead = record("C++ Lead", "DISSENT DISSENT", Some("Retry later."));
    lead.gate.verdict = GateVerdict::Halt;
    lead.gate.message = "dissent ratio 1.00 exceeds 0.50".to_string();
    run.record(AgentOutcome::Completed(Box::new(lead)));
    run.halt(HaltReason {
        source: HaltSource::Gate,
        agent: "C++ Lead".to_string(),
        message: "dissent ratio 1.00 exceeds 0.50".to_string(),
    });
    run.skip("Vulkan Guru");
    report.run = run;
    report
}
