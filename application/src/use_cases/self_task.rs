//! Self-directed task generation.
//!
//! Between manual tasks the pipeline can ask the backend to write its own
//! maintenance task from the town README and schedule.

use crate::ports::artifact_store::ArtifactStore;
use crate::ports::generation::GenerationBackend;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::generate::{GenerationClient, GenerationError};
use guildhall_domain::{PromptTemplate, TaskDocument};
use std::sync::Arc;
use tracing::info;

pub const README_PATH: &str = "town/README.md";
pub const SCHEDULE_PATH: &str = "town/schedule.md";

const SELF_TASK_TEMPERATURE: f32 = 0.3;

pub struct SelfTaskUseCase<B: GenerationBackend + ?Sized> {
    client: Arc<GenerationClient<B>>,
    store: Arc<dyn ArtifactStore>,
    pipeline_name: String,
}

impl<B: GenerationBackend + ?Sized> SelfTaskUseCase<B> {
    pub fn new(
        client: Arc<GenerationClient<B>>,
        store: Arc<dyn ArtifactStore>,
        pipeline_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            pipeline_name: pipeline_name.into(),
        }
    }

    /// Missing docs are sent as empty sections.
    pub async fn execute(
        &self,
        agents: &[String],
        progress: &dyn ProgressNotifier,
    ) -> Result<TaskDocument, GenerationError> {
        let readme = self.store.read(README_PATH).unwrap_or_default();
        let schedule = self.store.read(SCHEDULE_PATH).unwrap_or_default();
        let prompt = PromptTemplate::self_task(&self.pipeline_name, &readme, &schedule, agents);

        let generation = self
            .client
            .call(&prompt, SELF_TASK_TEMPERATURE, progress)
            .await?;
        let task = TaskDocument::parse(generation.text.trim());
        info!("Self-directed task generated: {}", task.id);
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{MemoryStore, ScriptedBackend, instant_retry};

    fn use_case(backend: Arc<ScriptedBackend>, store: MemoryStore) -> SelfTaskUseCase<ScriptedBackend> {
        let client = Arc::new(GenerationClient::new(backend, instant_retry(1), 60_000));
        SelfTaskUseCase::new(client, Arc::new(store), "guildhall")
    }

    #[tokio::test]
    async fn test_generated_task_is_parsed() {
        let backend = Arc::new(ScriptedBackend::texts(&[
            "## Task ID\nTIDY-HEADERS\n\n## Manual Action Statement\nSort includes.\n".to_string(),
        ]));
        let store = MemoryStore::with_docs(&[
            (README_PATH, "The town has guilds."),
            (SCHEDULE_PATH, "Mondays: tidy."),
        ]);

        let task = use_case(backend.clone(), store)
            .execute(&["C++ Lead".to_string(), "Refactorer".to_string()], &NoProgress)
            .await
            .unwrap();

        assert_eq!(task.id, "TIDY-HEADERS");
        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("The town has guilds."));
        assert!(prompt.contains("Mondays: tidy."));
        assert!(prompt.contains("1. C++ Lead\n2. Refactorer"));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(GatewayError::Timeout)]));

        let err = use_case(backend, MemoryStore::default())
            .execute(&[], &NoProgress)
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 1);
    }
}
