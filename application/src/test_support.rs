//! In-memory test doubles for every port, plus output fixtures.

use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::command_runner::{CommandOutput, CommandRunner};
use crate::ports::generation::{GatewayError, GenerationBackend};
use crate::ports::metrics_ledger::MetricsLedger;
use crate::ports::output_cache::{CacheError, OutputCache};
use crate::ports::version_control::{VcsError, VersionControl};
use crate::ports::workspace::{WorkspaceError, WorkspacePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildhall_domain::{
    Fingerprint, GateRules, MacroPreset, MacroSchema, MetricRecord, RetryPolicy, Roster,
    Selection, SelectionMode,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ==================== Fixtures ====================

/// Retry policy with no backoff wait.
pub fn instant_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_seconds: vec![0],
    }
}

/// Output that passes the default gate.
pub fn well_formed(agent: &str) -> String {
    format!(
        "1) Main Task Outcome\nReviewed the barrier placement for {agent}.\n\
         2) Secondary Task Outcomes\nNothing else.\n\
         3) Risks and Constraints\nLow risk overall.\n\
         4) Actionable TODOs\n- tighten the barrier\n\
         9) Recommended Next Run\nFollow \"wire the barrier helper\"\n"
    )
}

/// Well-formed output whose markers exceed the dissent threshold.
pub fn dissenting(agent: &str) -> String {
    format!(
        "{}7) Cross-Confirmation\n- CONCUR on layout\n- DISSENT on barrier\n- DISSENT on timing\n",
        well_formed(agent)
    )
}

pub fn default_schema() -> MacroSchema {
    MacroSchema::default()
}

pub fn default_preset() -> MacroPreset {
    default_schema().base_preset(12_000)
}

pub fn default_rules(preset: &MacroPreset) -> GateRules {
    GateRules::from_schema(&default_schema(), preset)
}

/// Selection of named roster agents in roster order.
pub fn select(names: &[&str]) -> Selection {
    let roster = Roster::new(default_schema().roster).unwrap();
    let agents = names
        .iter()
        .map(|n| roster.get(n).unwrap().clone())
        .collect::<Vec<_>>();
    Selection {
        mode: SelectionMode::Set(names.iter().map(|n| n.to_string()).collect()),
        agents,
    }
}

// ==================== Backend ====================

/// Backend that replays scripted results, then a fallback.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[String]) -> Self {
        Self::new(texts.iter().cloned().map(Ok).collect())
    }

    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| GatewayError::Other("script exhausted".to_string())),
        }
    }
}

// ==================== Workspace ====================

/// `*` matches any run of characters, including `/`.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == text,
        Some((head, rest)) => {
            let Some(tail) = text.strip_prefix(head) else {
                return false;
            };
            let rest = rest.trim_start_matches('*');
            (0..=tail.len())
                .filter(|i| tail.is_char_boundary(*i))
                .any(|i| wildcard_match(rest, &tail[i..]))
        }
    }
}

#[derive(Default)]
pub struct MemoryWorkspace {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryWorkspace {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            files: Mutex::new(
                files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.files.lock().unwrap().clone()
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl WorkspacePort for MemoryWorkspace {
    fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>, WorkspaceError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| wildcard_match(pattern, p))
            .cloned()
            .collect())
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        self.get(path).map(|c| c.len() as u64)
    }

    fn read(&self, path: &str) -> Result<Option<String>, WorkspaceError> {
        Ok(self.get(path))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), WorkspaceError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), WorkspaceError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

// ==================== Version Control ====================

/// VCS over a [`MemoryWorkspace`]; its baseline is the tree at creation.
///
/// `diff` renders whole-file rewrites. `apply` performs the scripted writes
/// (`None` removes) instead of parsing the patch.
pub struct FakeVcs {
    workspace: Arc<MemoryWorkspace>,
    baseline: BTreeMap<String, String>,
    apply_writes: Mutex<Vec<(String, Option<String>)>>,
    apply_error: Mutex<Option<VcsError>>,
    applied: Mutex<Vec<String>>,
    reported_paths: Option<Vec<String>>,
}

impl FakeVcs {
    pub fn new(workspace: Arc<MemoryWorkspace>) -> Self {
        let baseline = workspace.snapshot();
        Self {
            workspace,
            baseline,
            apply_writes: Mutex::new(Vec::new()),
            apply_error: Mutex::new(None),
            applied: Mutex::new(Vec::new()),
            reported_paths: None,
        }
    }

    /// Paths `patch_paths` reports instead of reading the patch.
    pub fn reporting_paths(mut self, paths: &[&str]) -> Self {
        self.reported_paths = Some(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn on_apply_write(self, path: &str, content: Option<&str>) -> Self {
        self.apply_writes
            .lock()
            .unwrap()
            .push((path.to_string(), content.map(str::to_string)));
        self
    }

    pub fn failing_apply(self, error: VcsError) -> Self {
        *self.apply_error.lock().unwrap() = Some(error);
        self
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    fn changed(&self, paths: &[String]) -> Vec<(String, String, String)> {
        paths
            .iter()
            .filter_map(|p| {
                let old = self.baseline.get(p).cloned().unwrap_or_default();
                let new = self.workspace.get(p).unwrap_or_default();
                (old != new).then(|| (p.clone(), old, new))
            })
            .collect()
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn diff(&self, paths: &[String]) -> Result<String, VcsError> {
        let mut out = String::new();
        for (path, old, new) in self.changed(paths) {
            out.push_str(&format!("diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n"));
            for line in old.lines() {
                out.push_str(&format!("-{line}\n"));
            }
            for line in new.lines() {
                out.push_str(&format!("+{line}\n"));
            }
        }
        Ok(out)
    }

    async fn numstat(&self, paths: &[String]) -> Result<String, VcsError> {
        Ok(self
            .changed(paths)
            .iter()
            .map(|(path, old, new)| format!("{}\t{}\t{path}\n", new.lines().count(), old.lines().count()))
            .collect())
    }

    async fn patch_paths(&self, patch: &str) -> Result<Vec<String>, VcsError> {
        Ok(self
            .reported_paths
            .clone()
            .unwrap_or_else(|| guildhall_domain::patch::changed_files(patch)))
    }

    async fn apply(&self, patch: &str) -> Result<(), VcsError> {
        if let Some(e) = self.apply_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.applied.lock().unwrap().push(patch.to_string());
        for (path, content) in self.apply_writes.lock().unwrap().iter() {
            match content {
                Some(c) => self.workspace.write(path, c).unwrap(),
                None => self.workspace.remove(path).unwrap(),
            }
        }
        Ok(())
    }
}

// ==================== Cache / Ledger / Store / Runner ====================

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Fingerprint, String>>,
    writes: Mutex<usize>,
}

impl MemoryCache {
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl OutputCache for MemoryCache {
    fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.entries.lock().unwrap().get(fingerprint).cloned()
    }

    fn store(&self, fingerprint: &Fingerprint, output: &str) -> Result<(), CacheError> {
        *self.writes.lock().unwrap() += 1;
        self.entries
            .lock()
            .unwrap()
            .insert(fingerprint.clone(), output.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingLedger {
    records: Mutex<Vec<MetricRecord>>,
}

impl RecordingLedger {
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl MetricsLedger for RecordingLedger {
    fn append(&self, record: &MetricRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn since(&self, since: DateTime<Utc>) -> Vec<MetricRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.timestamp >= since)
            .collect()
    }

    fn tail(&self, n: usize) -> Vec<String> {
        let records = self.records();
        let skip = records.len().saturating_sub(n);
        records[skip..]
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn with_docs(docs: &[(&str, &str)]) -> Self {
        Self {
            docs: Mutex::new(
                docs.iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.docs.lock().unwrap().get(path).cloned()
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, path: &str) -> Option<String> {
        self.get(path)
    }

    fn exists(&self, path: &str) -> bool {
        self.docs.lock().unwrap().contains_key(path)
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.docs
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn append(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.docs
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_str(content);
        Ok(())
    }

    fn list(&self, dir: &str, suffix: &str) -> Vec<String> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|name| !name.contains('/') && name.ends_with(suffix))
            .map(str::to_string)
            .collect()
    }

    fn display_path(&self, path: &str) -> String {
        path.to_string()
    }
}

pub struct FakeRunner {
    output: CommandOutput,
    commands: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn exiting(code: i32, output: &str) -> Self {
        Self {
            output: CommandOutput {
                code: Some(code),
                output: output.to_string(),
            },
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        self.commands.lock().unwrap().push(command.to_string());
        self.output.clone()
    }
}
