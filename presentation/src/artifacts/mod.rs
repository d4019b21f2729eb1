//! Persisting run artifacts through the [`ArtifactStore`](guildhall_application::ArtifactStore) port.

mod writer;

pub use writer::{ArtifactPaths, ArtifactWriter, NEXT_TASK_PATH, PROPOSALS_DIR, RUNS_DIR};
