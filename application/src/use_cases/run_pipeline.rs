//! Run Pipeline use case
//!
//! Drives the selected agents one at a time over the task. Each agent sees
//! the shared base, its persona and guild doctrine, the task, the rolling
//! handoff, the code context and (in sequential mode) every earlier public
//! output. Outputs are fingerprinted and cached, gated with at most one
//! corrective retry, capped, and recorded in the metrics ledger.

use crate::config::PipelineConfig;
use crate::ports::generation::GenerationBackend;
use crate::ports::metrics_ledger::MetricsLedger;
use crate::ports::output_cache::OutputCache;
use crate::ports::progress::{NoProgress, ProgressNotifier, Stage};
use crate::ports::workspace::WorkspacePort;
use crate::use_cases::generate::{Generation, GenerationClient, GenerationError};
use chrono::Utc;
use guildhall_domain::core::string::truncate_with_marker;
use guildhall_domain::gate::evaluate;
use guildhall_domain::output::split_reasoning;
use guildhall_domain::pipeline::{INDEPENDENT_HANDOFF, carry_forward, lead_handoff};
use guildhall_domain::prompt::{compose, section_contract};
use guildhall_domain::{
    AgentOutcome, AgentOutputRecord, AgentPromptInput, AgentSpec, ComposedPrompt, Fingerprint,
    GateOutcome, GateReport, GateRules, GateVerdict, HaltReason, HaltSource, MacroPreset,
    MetricRecord, OutputFields, PipelineRun, PromptTemplate, ReasoningSplit, Selection,
    TaskDocument,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No agents selected")]
    NoAgents,

    #[error("Agent {agent}: {source}")]
    Generation {
        agent: String,
        #[source]
        source: GenerationError,
    },
}

/// Persona and guild doctrine for one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentMaterial {
    pub persona: String,
    pub guild: String,
}

/// Input for the RunPipeline use case
#[derive(Debug, Clone)]
pub struct RunPipelineInput {
    pub run_id: String,
    pub task: TaskDocument,
    pub selection: Selection,
    pub preset: MacroPreset,
    pub gate_rules: GateRules,
    /// Code context, or the governance context for a solo privileged run.
    pub code_context: String,
    pub shared_base: String,
    pub materials: BTreeMap<String, AgentMaterial>,
}

/// Use case for running the agent sequence
pub struct RunPipelineUseCase<B: GenerationBackend + ?Sized> {
    client: Arc<GenerationClient<B>>,
    workspace: Arc<dyn WorkspacePort>,
    cache: Arc<dyn OutputCache>,
    ledger: Arc<dyn MetricsLedger>,
    config: PipelineConfig,
}

impl<B: GenerationBackend + ?Sized> RunPipelineUseCase<B> {
    pub fn new(
        client: Arc<GenerationClient<B>>,
        workspace: Arc<dyn WorkspacePort>,
        cache: Arc<dyn OutputCache>,
        ledger: Arc<dyn MetricsLedger>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            client,
            workspace,
            cache,
            ledger,
            config,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunPipelineInput) -> Result<PipelineRun, PipelineError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunPipelineInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineRun, PipelineError> {
        let agents = &input.selection.agents;
        if agents.is_empty() {
            return Err(PipelineError::NoAgents);
        }

        info!(
            "Starting run {} with {} agents ({} mode, macro {})",
            input.run_id,
            agents.len(),
            input.preset.mode,
            input.preset.label()
        );
        progress.on_stage_start(Stage::Agents, agents.len());

        let mut run = PipelineRun::new(input.run_id.clone());
        for (index, agent) in agents.iter().enumerate() {
            if run.is_halted() {
                info!("Skipping {}: pipeline halted", agent.name);
                run.skip(&agent.name);
                self.ledger.append(&skipped_metric(&input, &agent.name));
                progress.on_agent_skipped(&agent.name);
                continue;
            }

            progress.on_agent_start(&agent.name, index);
            let (record, public_full) = self.run_agent(&input, &run, agent, progress).await?;
            let verdict = record.verdict();
            progress.on_agent_complete(&agent.name, verdict, record.cache_hit);
            self.ledger.append(&metric(&input, &record));

            if verdict.is_halt() {
                warn!("Gate HALT for {}: {}", agent.name, record.gate.message);
                run.halt(HaltReason {
                    source: HaltSource::Gate,
                    agent: agent.name.clone(),
                    message: record.gate.message.clone(),
                });
            }

            let handoff = if agent.lead {
                let downstream: Vec<String> =
                    agents[index + 1..].iter().map(|a| a.name.clone()).collect();
                lead_handoff(&public_full, &downstream)
            } else {
                carry_forward(&agent.name, &public_full, input.preset.handoff_chars)
            };
            run.set_handoff(handoff);
            run.record(AgentOutcome::Completed(Box::new(record)));
        }

        progress.on_stage_complete(Stage::Agents);
        Ok(run)
    }

    /// Run one agent. Also returns the uncapped public text for the handoff.
    async fn run_agent(
        &self,
        input: &RunPipelineInput,
        run: &PipelineRun,
        agent: &AgentSpec,
        progress: &dyn ProgressNotifier,
    ) -> Result<(AgentOutputRecord, String), PipelineError> {
        let preset = &input.preset;
        let fingerprint = Fingerprint::compute(
            &input.task.text,
            &input.code_context,
            &agent.name,
            preset.label(),
        );
        let started = Instant::now();

        let cached = if self.config.force_rerun {
            debug!("Force rerun: bypassing cache for {}", agent.name);
            None
        } else {
            self.cache.lookup(&fingerprint)
        };

        let (raw, gate, attempts, prompt_chars, cache_hit) = match cached {
            Some(text) => {
                info!("Cache hit for {} ({})", agent.name, fingerprint.short());
                // No retry on a cached output; the gate still runs so a
                // cached HALT halts again.
                let gate = self.gate(&text, &input.gate_rules).downgrade_retry();
                (text, gate, 0, 0, true)
            }
            None => {
                let prompt_input = self.prompt_input(input, run, agent);
                let (text, gate, attempts, prompt_chars) = self
                    .generate_gated(&prompt_input, preset, &input.gate_rules, agent, progress)
                    .await?;
                if let Err(e) = self.cache.store(&fingerprint, &text) {
                    warn!("{}", e);
                }
                (text, gate, attempts, prompt_chars, false)
            }
        };

        let split = split_reasoning(&raw);
        // Extract before capping so truncation cannot lose the next-run line.
        let fields = OutputFields::extract(&split.public);
        let capped = truncate_with_marker(&split.public, preset.max_output_chars);
        let truncated = capped.len() != split.public.len();
        if truncated {
            info!(
                "Output truncated for {} ({} -> {} chars)",
                agent.name,
                split.public.len(),
                preset.max_output_chars
            );
        }

        let record = AgentOutputRecord {
            agent: agent.name.clone(),
            raw,
            split: ReasoningSplit {
                public: capped,
                reasoning: split.reasoning,
            },
            fields,
            gate,
            fingerprint,
            cache_hit,
            truncated,
            latency_ms: started.elapsed().as_millis() as u64,
            prompt_chars,
            attempts,
        };
        Ok((record, split.public))
    }

    fn compose_for(&self, prompt_input: &AgentPromptInput, agent: &AgentSpec) -> ComposedPrompt {
        let prompt = compose(prompt_input, self.config.prompt_limits());
        if !prompt.trims.is_empty() {
            debug!("Prompt for {} trimmed: {:?}", agent.name, prompt.trims);
        }
        prompt
    }

    /// Backend call plus the single corrective retry on a RETRY verdict.
    ///
    /// The correction joins the output contract, so the composer fits the
    /// retry prompt around it instead of cutting it.
    async fn generate_gated(
        &self,
        prompt_input: &AgentPromptInput,
        preset: &MacroPreset,
        rules: &GateRules,
        agent: &AgentSpec,
        progress: &dyn ProgressNotifier,
    ) -> Result<(String, GateReport, u32, usize), PipelineError> {
        let prompt = self.compose_for(prompt_input, agent);
        let first = self.call(&prompt, preset, agent, progress).await?;
        let gate = self.gate(&first.text, rules);
        if gate.verdict != GateVerdict::Retry {
            return Ok((first.text, gate, first.attempts, first.prompt_chars));
        }
        if !preset.retry_on_gate_fail {
            return Ok((first.text, gate.downgrade_retry(), first.attempts, first.prompt_chars));
        }

        info!("Gate RETRY for {}: {}", agent.name, gate.message);
        let mut retry_input = prompt_input.clone();
        retry_input.contract =
            PromptTemplate::retry_instruction(&prompt_input.contract, &gate.message);
        let retry_prompt = self.compose_for(&retry_input, agent);
        let second = self.call(&retry_prompt, preset, agent, progress).await?;
        let gate = self.gate(&second.text, rules).downgrade_retry();
        if gate.verdict == GateVerdict::Warn {
            debug!("Gate WARN for {} after retry: {}", agent.name, gate.message);
        }
        Ok((
            second.text,
            gate,
            first.attempts + second.attempts,
            second.prompt_chars,
        ))
    }

    async fn call(
        &self,
        prompt: &ComposedPrompt,
        preset: &MacroPreset,
        agent: &AgentSpec,
        progress: &dyn ProgressNotifier,
    ) -> Result<Generation, PipelineError> {
        self.client
            .call_composed(prompt, preset.temperature, progress)
            .await
            .map_err(|source| PipelineError::Generation {
                agent: agent.name.clone(),
                source,
            })
    }

    /// The gate always judges the public text.
    fn gate(&self, text: &str, rules: &GateRules) -> GateReport {
        let public = split_reasoning(text).public;
        evaluate(&public, rules, |p| self.workspace.exists(p))
    }

    fn prompt_input(
        &self,
        input: &RunPipelineInput,
        run: &PipelineRun,
        agent: &AgentSpec,
    ) -> AgentPromptInput {
        let preset = &input.preset;
        let material = input.materials.get(&agent.name).cloned().unwrap_or_default();
        let independent = preset.mode.is_independent();
        AgentPromptInput {
            pipeline_name: self.config.pipeline_name.clone(),
            shared_base: input.shared_base.clone(),
            persona: material.persona,
            guild: material.guild,
            directive: preset.directive_for(&agent.name).map(str::to_string),
            task: input.task.text.clone(),
            agent: agent.name.clone(),
            handoff: if independent {
                INDEPENDENT_HANDOFF.to_string()
            } else {
                run.handoff().to_string()
            },
            code_context: input.code_context.clone(),
            prior_outputs: if independent {
                Vec::new()
            } else {
                run.public_outputs()
            },
            handoff_chars: preset.handoff_chars,
            contract: section_contract(&preset.required_sections, preset.cross_confirm),
        }
    }
}

fn metric(input: &RunPipelineInput, record: &AgentOutputRecord) -> MetricRecord {
    let gate = &record.gate;
    MetricRecord {
        timestamp: Utc::now(),
        run_id: input.run_id.clone(),
        agent: record.agent.clone(),
        macro_name: input.preset.label().to_string(),
        task_id: input.task.id.clone(),
        fingerprint: record.fingerprint.to_string(),
        latency_ms: record.latency_ms,
        prompt_chars: record.prompt_chars,
        output_chars: record.raw.len(),
        gate_result: if record.cache_hit {
            GateOutcome::Cache
        } else {
            GateOutcome::from(gate.verdict)
        },
        sections_found: gate.sections_found,
        concur_count: gate.markers.concur,
        qualify_count: gate.markers.qualify,
        dissent_count: gate.markers.dissent,
        confidence: gate.confidence.to_string(),
        cache_hit: record.cache_hit,
        attempts: record.attempts,
    }
}

fn skipped_metric(input: &RunPipelineInput, agent: &str) -> MetricRecord {
    MetricRecord {
        timestamp: Utc::now(),
        run_id: input.run_id.clone(),
        agent: agent.to_string(),
        macro_name: input.preset.label().to_string(),
        task_id: input.task.id.clone(),
        fingerprint: String::new(),
        latency_ms: 0,
        prompt_chars: 0,
        output_chars: 0,
        gate_result: GateOutcome::Skipped,
        sections_found: 0,
        concur_count: 0,
        qualify_count: 0,
        dissent_count: 0,
        confidence: "UNKNOWN".to_string(),
        cache_hit: false,
        attempts: 0,
    }
}
