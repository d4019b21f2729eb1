//! Resolve a task's scope references into concrete files.

use crate::ports::workspace::WorkspacePort;
use guildhall_domain::ScopeToken;
use guildhall_domain::task::scope_tokens;
use tracing::{debug, warn};

/// Expand the task's backticked scope references.
///
/// Globs expand to their current matches in lexical order; plain paths
/// that do not exist are dropped (they may not be created yet). The result
/// keeps first-seen order and contains no duplicates.
pub fn resolve_scope(task_text: &str, workspace: &dyn WorkspacePort) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for token in scope_tokens(task_text) {
        let expanded = match &token {
            ScopeToken::Path(path) => {
                if workspace.exists(path) {
                    vec![path.clone()]
                } else {
                    debug!("Scope path {} does not exist yet", path);
                    Vec::new()
                }
            }
            ScopeToken::Glob(pattern) => match workspace.glob(pattern) {
                Ok(matches) => matches,
                Err(e) => {
                    warn!("Skipping scope pattern: {}", e);
                    Vec::new()
                }
            },
        };
        for file in expanded {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }
    debug!("Resolved {} scope files", files.len());
    files
}
