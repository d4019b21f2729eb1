//! Budgeted code context for the agent prompts.

use crate::ports::workspace::WorkspacePort;
use guildhall_domain::context::{
    ContextBudget, FileExcerpt, ScopedFile, assemble, pair_counterparts, rank_by_relevance,
};
use tracing::{debug, warn};

/// Rank, pair and read the scope files into one context string.
///
/// Relevance ranking runs first, then counterpart pairing, so a header
/// always lands directly next to its implementation regardless of score.
pub fn build_context(
    files: &[String],
    keywords: &[String],
    budget: ContextBudget,
    workspace: &dyn WorkspacePort,
) -> String {
    let excerpts = read_excerpts(&ordered_files(files, keywords, workspace), workspace);
    let context = assemble(&excerpts, budget);
    debug!(
        "Built code context: {} files, {} chars",
        excerpts.len(),
        context.len()
    );
    context
}

/// Ranked and paired file order.
pub fn ordered_files(
    files: &[String],
    keywords: &[String],
    workspace: &dyn WorkspacePort,
) -> Vec<String> {
    let scoped: Vec<ScopedFile> = files
        .iter()
        .map(|f| ScopedFile::new(f.clone(), workspace.file_size(f).unwrap_or(0)))
        .collect();
    let ranked: Vec<String> = rank_by_relevance(&scoped, keywords)
        .into_iter()
        .map(|f| f.path)
        .collect();
    pair_counterparts(&ranked, |p| workspace.exists(p))
}

/// Read each file, skipping missing or unreadable ones.
pub fn read_excerpts(files: &[String], workspace: &dyn WorkspacePort) -> Vec<FileExcerpt> {
    files
        .iter()
        .filter_map(|path| match workspace.read(path) {
            Ok(Some(content)) => Some(FileExcerpt::new(path.clone(), content)),
            Ok(None) => None,
            Err(e) => {
                warn!("Skipping unreadable file: {}", e);
                None
            }
        })
        .collect()
}
