//! Generate Patch use case
//!
//! Turns agent proposals into a diff artifact. The working tree is edited
//! only long enough to capture `git diff`, then restored byte for byte.
//!
//! Flow:
//! 1. Re-read the files the proposals reference (authoritative content).
//! 2. Ask for FILE/SEARCH/REPLACE blocks, parsed with three grammars.
//! 3. Reject the whole proposal if any block leaves the allowlist.
//! 4. Apply blocks through the three matching tiers, diff, revert.
//! 5. No blocks or an empty diff: ask for a whole unified diff instead.

use crate::ports::generation::GenerationBackend;
use crate::ports::progress::{ProgressNotifier, Stage};
use crate::ports::version_control::{VcsError, VersionControl};
use crate::ports::workspace::{WorkspaceError, WorkspacePort};
use crate::use_cases::build_context::read_excerpts;
use crate::use_cases::generate::{GenerationClient, GenerationError};
use guildhall_domain::core::string::prefix;
use guildhall_domain::gate::referenced_source_files;
use guildhall_domain::patch::{apply_blocks, changed_files, extract_legacy_patch, parse_edit_blocks};
use guildhall_domain::prompt::PatchPromptInput;
use guildhall_domain::review::api_inventory;
use guildhall_domain::{
    BlockGrammar, FileExcerpt, MacroPreset, PatchProposal, PipelineRun, PromptTemplate,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const PER_OUTPUT_CHARS: usize = 2500;
const INVENTORY_CHARS: usize = 4000;
const PATCH_TEMPERATURE: f32 = 0.1;

#[derive(Error, Debug)]
pub enum PatchGenerationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// How a produced diff was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchSource {
    Blocks(BlockGrammar),
    Legacy,
}

impl std::fmt::Display for PatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchSource::Blocks(grammar) => write!(f, "edit blocks ({grammar})"),
            PatchSource::Legacy => write!(f, "legacy diff"),
        }
    }
}

/// What patch generation left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchArtifact {
    /// The macro does not produce patches.
    NotRequested,
    /// The run halted and patching after a halt is disabled.
    SkippedAfterHalt,
    Produced {
        diff: String,
        source: PatchSource,
        files: Vec<String>,
    },
    /// A block or diff touched a file outside the allowlist.
    Rejected { reason: String },
    /// Nothing usable came back.
    Empty { reason: String },
}

impl PatchArtifact {
    pub fn diff(&self) -> Option<&str> {
        match self {
            PatchArtifact::Produced { diff, .. } => Some(diff),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            PatchArtifact::NotRequested => "not-requested",
            PatchArtifact::SkippedAfterHalt => "skipped-after-halt",
            PatchArtifact::Produced { .. } => "produced",
            PatchArtifact::Rejected { .. } => "rejected",
            PatchArtifact::Empty { .. } => "empty",
        }
    }

    /// Contents of the `.patch` file: the diff, or an explanatory comment.
    pub fn file_text(&self) -> String {
        match self {
            PatchArtifact::Produced { diff, .. } => diff.clone(),
            PatchArtifact::NotRequested => {
                "# No patch: this macro does not produce patches.\n".to_string()
            }
            PatchArtifact::SkippedAfterHalt => {
                "# No patch: pipeline halted and patch_after_halt is disabled.\n".to_string()
            }
            PatchArtifact::Rejected { reason } => format!("# Patch rejected: {reason}\n"),
            PatchArtifact::Empty { reason } => format!("# No patch: {reason}\n"),
        }
    }
}

/// Artifact plus per-block diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub artifact: PatchArtifact,
    pub blocks_parsed: usize,
    pub blocks_applied: usize,
    pub block_errors: Vec<String>,
}

impl PatchReport {
    fn bare(artifact: PatchArtifact) -> Self {
        Self {
            artifact,
            blocks_parsed: 0,
            blocks_applied: 0,
            block_errors: Vec::new(),
        }
    }
}

/// Input for the GeneratePatch use case
#[derive(Debug, Clone, Copy)]
pub struct PatchRequest<'a> {
    pub run: &'a PipelineRun,
    pub preset: &'a MacroPreset,
    pub task: &'a str,
    pub allowlist: &'a [String],
    pub source_extensions: &'a [String],
    pub patch_after_halt: bool,
}

pub struct GeneratePatchUseCase<B: GenerationBackend + ?Sized> {
    client: Arc<GenerationClient<B>>,
    workspace: Arc<dyn WorkspacePort>,
    vcs: Arc<dyn VersionControl>,
}

impl<B: GenerationBackend + ?Sized> GeneratePatchUseCase<B> {
    pub fn new(
        client: Arc<GenerationClient<B>>,
        workspace: Arc<dyn WorkspacePort>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            client,
            workspace,
            vcs,
        }
    }

    pub async fn execute(
        &self,
        request: PatchRequest<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<PatchReport, PatchGenerationError> {
        if !request.preset.produces_patch {
            return Ok(PatchReport::bare(PatchArtifact::NotRequested));
        }
        if request.run.is_halted() && !request.patch_after_halt {
            info!("Skipping patch generation: pipeline halted");
            return Ok(PatchReport::bare(PatchArtifact::SkippedAfterHalt));
        }
        if request.allowlist.is_empty() {
            return Ok(PatchReport::bare(PatchArtifact::Empty {
                reason: "no in-scope files to patch.".to_string(),
            }));
        }

        progress.on_stage_start(Stage::Patch, 1);
        let outputs = request.run.public_outputs();
        let files = self.referenced_files(&request);
        let excerpts = budgeted(
            read_excerpts(&files, self.workspace.as_ref()),
            request.preset.context_chars,
        );
        let inventory = api_inventory(&excerpts);
        debug!(
            "Patch context: {} files, {} API names",
            excerpts.len(),
            inventory.len()
        );

        let prompt = PromptTemplate::patch_blocks(&PatchPromptInput {
            task: request.task,
            outputs: &outputs,
            file_contents: &render_files(&excerpts),
            api_inventory: &inventory.render(INVENTORY_CHARS),
            allowlist: request.allowlist,
            per_output_chars: PER_OUTPUT_CHARS,
        });
        let response = self.client.call(&prompt, PATCH_TEMPERATURE, progress).await?;

        let mut report = PatchReport::bare(PatchArtifact::Empty {
            reason: "no edit blocks could be parsed.".to_string(),
        });
        if let Some(parsed) = parse_edit_blocks(&response.text) {
            info!(
                "Parsed {} edit blocks ({} grammar)",
                parsed.blocks.len(),
                parsed.grammar
            );
            report.blocks_parsed = parsed.blocks.len();
            let proposal = PatchProposal::new(parsed.blocks);
            if let Err(e) = proposal.check_scope(request.allowlist) {
                warn!("{}", e);
                report.artifact = PatchArtifact::Rejected {
                    reason: e.to_string(),
                };
                progress.on_stage_complete(Stage::Patch);
                return Ok(report);
            }
            let (diff, applied, errors) = self.diff_from_blocks(&proposal).await?;
            report.blocks_applied = applied;
            report.block_errors = errors;
            if diff.trim().is_empty() {
                report.artifact = PatchArtifact::Empty {
                    reason: "edit blocks produced no diff.".to_string(),
                };
            } else {
                report.artifact = PatchArtifact::Produced {
                    files: changed_files(&diff),
                    diff,
                    source: PatchSource::Blocks(parsed.grammar),
                };
            }
        }

        if report.artifact.diff().is_none() {
            let reason = match &report.artifact {
                PatchArtifact::Empty { reason } => reason.clone(),
                _ => String::new(),
            };
            info!("Falling back to legacy diff extraction ({})", reason);
            report.artifact = self.legacy(&request, &outputs, progress, &reason).await?;
        }

        progress.on_stage_complete(Stage::Patch);
        Ok(report)
    }

    /// Existing allowlisted files named in any proposal, else the allowlist.
    fn referenced_files(&self, request: &PatchRequest<'_>) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for record in request.run.completed() {
            let text = record
                .fields
                .code_proposal
                .as_deref()
                .unwrap_or(record.public_text());
            for reference in referenced_source_files(text, request.source_extensions) {
                let candidates = [reference.clone(), format!("src/{reference}")];
                if let Some(found) = candidates
                    .into_iter()
                    .find(|c| request.allowlist.contains(c) && self.workspace.exists(c))
                    && !files.contains(&found)
                {
                    files.push(found);
                }
            }
        }
        if files.is_empty() {
            request.allowlist.to_vec()
        } else {
            files
        }
    }

    /// Apply accepted blocks, capture the diff, restore the tree.
    async fn diff_from_blocks(
        &self,
        proposal: &PatchProposal,
    ) -> Result<(String, usize, Vec<String>), PatchGenerationError> {
        let targets = proposal.files();
        let mut snapshot: BTreeMap<String, Option<String>> = BTreeMap::new();
        for file in &targets {
            snapshot.insert(file.clone(), self.workspace.read(file)?);
        }
        let originals: BTreeMap<String, String> = snapshot
            .iter()
            .map(|(f, c)| (f.clone(), c.clone().unwrap_or_default()))
            .collect();

        let result = apply_blocks(&originals, &proposal.blocks);
        let errors: Vec<String> = result.errors().iter().map(|e| e.to_string()).collect();
        for outcome in &result.outcomes {
            match &outcome.result {
                Ok(tier) => debug!("Block on {} matched ({})", outcome.file, tier),
                Err(e) => warn!("Block failed: {}", e),
            }
        }

        let changed: Vec<String> = result.contents.keys().cloned().collect();
        let written = self.write_all(&result.contents);
        let diff = match written {
            Ok(()) => self.vcs.diff(&changed).await.map_err(PatchGenerationError::from),
            Err(e) => Err(e),
        };
        restore(self.workspace.as_ref(), &snapshot)?;
        Ok((diff?, result.applied(), errors))
    }

    fn write_all(&self, contents: &BTreeMap<String, String>) -> Result<(), PatchGenerationError> {
        for (file, content) in contents {
            self.workspace.write(file, content)?;
        }
        Ok(())
    }

    async fn legacy(
        &self,
        request: &PatchRequest<'_>,
        outputs: &[(String, String)],
        progress: &dyn ProgressNotifier,
        why: &str,
    ) -> Result<PatchArtifact, PatchGenerationError> {
        let prompt = PromptTemplate::legacy_patch(request.task, outputs, request.allowlist);
        let response = self.client.call(&prompt, PATCH_TEMPERATURE, progress).await?;
        let Some(diff) = extract_legacy_patch(&response.text) else {
            return Ok(PatchArtifact::Empty {
                reason: format!("{} The fallback response contained no diff.", why.trim())
                    .trim()
                    .to_string(),
            });
        };
        let files = changed_files(&diff);
        let disallowed: Vec<&String> = files
            .iter()
            .filter(|f| !request.allowlist.contains(f))
            .collect();
        if !disallowed.is_empty() {
            let joined = disallowed
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            warn!("Legacy diff touches disallowed files: {}", joined);
            return Ok(PatchArtifact::Rejected {
                reason: format!("Patch proposal touches disallowed files: {joined}"),
            });
        }
        Ok(PatchArtifact::Produced {
            diff,
            source: PatchSource::Legacy,
            files,
        })
    }
}

/// Write back captured contents; files that did not exist are removed.
pub(crate) fn restore(
    workspace: &dyn WorkspacePort,
    snapshot: &BTreeMap<String, Option<String>>,
) -> Result<(), WorkspaceError> {
    for (file, original) in snapshot {
        match original {
            Some(content) => workspace.write(file, content)?,
            None => workspace.remove(file)?,
        }
    }
    Ok(())
}

/// Keep whole files while the budget allows, then one cut file.
fn budgeted(excerpts: Vec<FileExcerpt>, budget: usize) -> Vec<FileExcerpt> {
    let mut out = Vec::new();
    let mut used = 0usize;
    for excerpt in excerpts {
        let remaining = budget.saturating_sub(used);
        if remaining == 0 {
            break;
        }
        let content = prefix(&excerpt.content, remaining).to_string();
        used += content.len();
        out.push(FileExcerpt::new(excerpt.path, content));
    }
    out
}

fn render_files(excerpts: &[FileExcerpt]) -> String {
    excerpts
        .iter()
        .map(|e| format!("## {}\n```\n{}\n```", e.path, e.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::test_support::*;
    use guildhall_domain::{
        AgentOutcome, AgentOutputRecord, Fingerprint, HaltReason, HaltSource,
        OutputFields, ReasoningSplit,
    };
    use guildhall_domain::gate::{GateRules, evaluate};

    const POOL: &str = "void Pool::reset() {\n    vkResetDescriptorPool(dev, pool, 0);\n}\n";

    struct Harness {
        backend: Arc<ScriptedBackend>,
        workspace: Arc<MemoryWorkspace>,
        use_case: GeneratePatchUseCase<ScriptedBackend>,
    }

    fn harness(responses: &[&str]) -> Harness {
        let backend = Arc::new(ScriptedBackend::texts(
            &responses.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        ));
        let workspace = Arc::new(MemoryWorkspace::with_files(&[
            ("src/pool.cpp", POOL),
            ("src/y.cpp", "int y = 1;\n"),
        ]));
        let vcs = Arc::new(FakeVcs::new(workspace.clone()));
        let client = Arc::new(GenerationClient::new(backend.clone(), instant_retry(1), 60_000));
        Harness {
            backend,
            use_case: GeneratePatchUseCase::new(client, workspace.clone(), vcs),
            workspace,
        }
    }

    fn run_with_proposal(proposal: &str) -> PipelineRun {
        let mut run = PipelineRun::new("r");
        let text = format!("6) Code Proposal\n{proposal}\n");
        let rules: GateRules = default_rules(&default_preset());
        run.record(AgentOutcome::Completed(Box::new(AgentOutputRecord {
            agent: "Vulkan Guru".to_string(),
            raw: text.clone(),
            split: ReasoningSplit {
                public: text.clone(),
                reasoning: String::new(),
            },
            fields: OutputFields::extract(&text),
            gate: evaluate(&text, &rules, |_| true),
            fingerprint: Fingerprint::compute("t", "c", "Vulkan Guru", "none"),
            cache_hit: false,
            truncated: false,
            latency_ms: 1,
            prompt_chars: 1,
            attempts: 1,
        })));
        run
    }

    fn request<'a>(
        run: &'a PipelineRun,
        preset: &'a MacroPreset,
        allowlist: &'a [String],
        extensions: &'a [String],
    ) -> PatchRequest<'a> {
        PatchRequest {
            run,
            preset,
            task: "Reset pools with flags",
            allowlist,
            source_extensions: extensions,
            patch_after_halt: true,
        }
    }

    fn exts() -> Vec<String> {
        vec!["cpp".to_string(), "h".to_string()]
    }

    // ==================== Block Path Tests ====================

    #[tokio::test]
    async fn test_blocks_produce_diff_and_tree_is_restored() {
        let response = "FILE: src/pool.cpp\nSEARCH: <<<\n    vkResetDescriptorPool(dev, pool, 0);\n>>>\nREPLACE: <<<\n    vkResetDescriptorPool(dev, pool, flags);\n>>>\n";
        let h = harness(&[response]);
        let before = h.workspace.snapshot();
        let run = run_with_proposal("Change `pool.cpp` to pass flags.");
        let preset = default_preset();
        let allow = vec!["src/pool.cpp".to_string(), "src/y.cpp".to_string()];
        let ext = exts();

        let report = h
            .use_case
            .execute(request(&run, &preset, &allow, &ext), &NoProgress)
            .await
            .unwrap();

        match &report.artifact {
            PatchArtifact::Produced { diff, source, files } => {
                assert_eq!(*source, PatchSource::Blocks(BlockGrammar::Strict));
                assert_eq!(files, &vec!["src/pool.cpp".to_string()]);
                assert!(diff.contains("+    vkResetDescriptorPool(dev, pool, flags);"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(report.blocks_applied, 1);
        assert_eq!(h.workspace.snapshot(), before);
        // only the referenced file is sent as authoritative content
        let prompt = &h.backend.prompts()[0];
        assert!(prompt.contains("## src/pool.cpp"));
        assert!(!prompt.contains("## src/y.cpp"));
    }

    #[tokio::test]
    async fn test_disallowed_block_rejects_whole_proposal() {
        let response = "FILE: src/y.cpp\nSEARCH: <<<\nint y = 1;\n>>>\nREPLACE: <<<\nint y = 2;\n>>>\n\nFILE: src/x.cpp\nSEARCH: <<<\n>>>\nREPLACE: <<<\nint x;\n>>>\n";
        let h = harness(&[response]);
        let before = h.workspace.snapshot();
        let run = run_with_proposal("Touch y and x.");
        let preset = default_preset();
        let allow = vec!["src/y.cpp".to_string()];
        let ext = exts();

        let report = h
            .use_case
            .execute(request(&run, &preset, &allow, &ext), &NoProgress)
            .await
            .unwrap();

        assert_eq!(
            report.artifact,
            PatchArtifact::Rejected {
                reason: "Patch proposal touches disallowed files: src/x.cpp".to_string()
            }
        );
        assert_eq!(report.blocks_applied, 0);
        assert_eq!(h.workspace.snapshot(), before);
        assert_eq!(h.backend.call_count(), 1);
    }

    // ==================== Fallback Tests ====================

    #[tokio::test]
    async fn test_unparseable_response_falls_back_to_legacy_diff() {
        let legacy = "```diff\ndiff --git a/src/y.cpp b/src/y.cpp\n--- a/src/y.cpp\n+++ b/src/y.cpp\n@@ -1 +1 @@\n-int y = 1;\n+int y = 2;\n```";
        let h = harness(&["I would change y to two.", legacy]);
        let run = run_with_proposal("Set y to two.");
        let preset = default_preset();
        let allow = vec!["src/y.cpp".to_string()];
        let ext = exts();

        let report = h
            .use_case
            .execute(request(&run, &preset, &allow, &ext), &NoProgress)
            .await
            .unwrap();

        match &report.artifact {
            PatchArtifact::Produced { source, files, .. } => {
                assert_eq!(*source, PatchSource::Legacy);
                assert_eq!(files, &vec!["src/y.cpp".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_total_parse_failure_is_explained() {
        let h = harness(&["No idea.", "Still no idea."]);
        let run = run_with_proposal("Nothing concrete.");
        let preset = default_preset();
        let allow = vec!["src/y.cpp".to_string()];
        let ext = exts();

        let report = h
            .use_case
            .execute(request(&run, &preset, &allow, &ext), &NoProgress)
            .await
            .unwrap();

        assert_eq!(report.artifact.status(), "empty");
        assert!(report.artifact.file_text().starts_with("# No patch: "));
    }

    // ==================== Policy Tests ====================

    #[tokio::test]
    async fn test_not_requested_and_halt_policy() {
        let h = harness(&[]);
        let mut run = run_with_proposal("x");
        let mut preset = default_preset();
        preset.produces_patch = false;
        let allow = vec!["src/y.cpp".to_string()];
        let ext = exts();
        let report = h
            .use_case
            .execute(request(&run, &preset, &allow, &ext), &NoProgress)
            .await
            .unwrap();
        assert_eq!(report.artifact, PatchArtifact::NotRequested);

        run.halt(HaltReason {
            source: HaltSource::Gate,
            agent: "Vulkan Guru".to_string(),
            message: "Low confidence".to_string(),
        });
        let preset = default_preset();
        let mut req = request(&run, &preset, &allow, &ext);
        req.patch_after_halt = false;
        let report = h.use_case.execute(req, &NoProgress).await.unwrap();
        assert_eq!(report.artifact, PatchArtifact::SkippedAfterHalt);
        assert_eq!(h.backend.call_count(), 0);
    }
}
