//! Guild Review use case
//!
//! One cross-check call after the sequence. The reviewer sees every
//! agent's output and the callable names found in the in-scope files, and
//! answers APPROVE, CAUTION or BLOCK. Only BLOCK changes the run.

use crate::ports::generation::GenerationBackend;
use crate::ports::progress::{ProgressNotifier, Stage};
use crate::use_cases::generate::{GenerationClient, GenerationError};
use guildhall_domain::review::{api_inventory, parse_review};
use guildhall_domain::{
    FileExcerpt, GuildReview, HaltReason, HaltSource, MacroPreset, PipelineRun, PromptTemplate,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Agent name recorded on a review halt.
pub const REVIEWER: &str = "Guild Review";

const PER_OUTPUT_CHARS: usize = 1500;
const INVENTORY_CHARS: usize = 4000;
const REVIEW_TEMPERATURE: f32 = 0.1;

pub struct GuildReviewUseCase<B: GenerationBackend + ?Sized> {
    client: Arc<GenerationClient<B>>,
}

impl<B: GenerationBackend + ?Sized> GuildReviewUseCase<B> {
    pub fn new(client: Arc<GenerationClient<B>>) -> Self {
        Self { client }
    }

    /// Review the run, halting it on BLOCK.
    ///
    /// Returns `None` when the macro does not ask for a review or the run
    /// is already halted.
    pub async fn execute(
        &self,
        run: &mut PipelineRun,
        preset: &MacroPreset,
        task: &str,
        scope_files: &[FileExcerpt],
        progress: &dyn ProgressNotifier,
    ) -> Result<Option<GuildReview>, GenerationError> {
        if !preset.guild_review {
            debug!("Guild review not enabled for macro {}", preset.label());
            return Ok(None);
        }
        if run.is_halted() {
            info!("Skipping guild review: pipeline halted");
            return Ok(None);
        }

        progress.on_stage_start(Stage::GuildReview, 1);
        let inventory = api_inventory(scope_files);
        let prompt = PromptTemplate::guild_review(
            task,
            &run.public_outputs(),
            PER_OUTPUT_CHARS,
            &inventory.render(INVENTORY_CHARS),
        );
        let response = self
            .client
            .call(&prompt, REVIEW_TEMPERATURE, progress)
            .await?;
        let review = parse_review(&response.text);
        if !review.well_formed {
            warn!("Guild review returned no readable verdict; treating as CAUTION");
        }
        info!("Guild review verdict: {} ({})", review.verdict, review.summary);

        if review.blocks() {
            run.halt(HaltReason {
                source: HaltSource::GuildReview,
                agent: REVIEWER.to_string(),
                message: review.summary.clone(),
            });
        }
        progress.on_stage_complete(Stage::GuildReview);
        Ok(Some(review))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{ScriptedBackend, default_preset, instant_retry};
    use guildhall_domain::ReviewVerdict;

    fn use_case(backend: Arc<ScriptedBackend>) -> GuildReviewUseCase<ScriptedBackend> {
        GuildReviewUseCase::new(Arc::new(GenerationClient::new(backend, instant_retry(1), 60_000)))
    }

    fn enabled() -> MacroPreset {
        let mut preset = default_preset();
        preset.guild_review = true;
        preset
    }

    fn files() -> Vec<FileExcerpt> {
        vec![FileExcerpt::new("src/pool.cpp", "void Pool::reset() { vkResetDescriptorPool(dev, pool, 0); }")]
    }

    #[tokio::test]
    async fn test_block_halts_run() {
        let backend = Arc::new(ScriptedBackend::texts(&[
            "VERDICT: BLOCK\nSUMMARY: Calls vkFooBar which does not exist.\nSUSPECT_APIS: vkFooBar".to_string(),
        ]));
        let mut run = PipelineRun::new("r");
        let review = use_case(backend.clone())
            .execute(&mut run, &enabled(), "task", &files(), &NoProgress)
            .await
            .unwrap()
            .unwrap();

        assert!(review.blocks());
        let halt = run.halt_reason().unwrap();
        assert_eq!(halt.source, HaltSource::GuildReview);
        assert_eq!(halt.message, "Calls vkFooBar which does not exist.");
        assert!(backend.prompts()[0].contains("vkResetDescriptorPool"));
    }

    #[tokio::test]
    async fn test_caution_is_logged_only() {
        let backend = Arc::new(ScriptedBackend::texts(&[
            "VERDICT: CAUTION\nSUMMARY: Check the pool sizing.\nSUSPECT_APIS: none".to_string(),
        ]));
        let mut run = PipelineRun::new("r");
        let review = use_case(backend)
            .execute(&mut run, &enabled(), "task", &files(), &NoProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(review.verdict, ReviewVerdict::Caution);
        assert!(!run.is_halted());
    }

    #[tokio::test]
    async fn test_disabled_or_halted_makes_no_call() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let uc = use_case(backend.clone());
        let mut run = PipelineRun::new("r");
        assert!(uc
            .execute(&mut run, &default_preset(), "task", &files(), &NoProgress)
            .await
            .unwrap()
            .is_none());

        run.halt(HaltReason {
            source: HaltSource::Gate,
            agent: "C++ Lead".to_string(),
            message: "Low confidence".to_string(),
        });
        assert!(uc
            .execute(&mut run, &enabled(), "task", &files(), &NoProgress)
            .await
            .unwrap()
            .is_none());
        assert_eq!(backend.call_count(), 0);
    }
}
