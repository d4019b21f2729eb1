//! Edit blocks and patch proposals.

use crate::core::error::DomainError;

/// One `(file, search, replace)` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBlock {
    pub file: String,
    pub search: String,
    pub replace: String,
}

impl EditBlock {
    pub fn new(file: impl Into<String>, search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            file: normalize_path(&file.into()),
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// Strip decoration models put around paths.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(['`', '"', '\'', '*']).trim();
    trimmed.strip_prefix("./").unwrap_or(trimmed).to_string()
}

/// Ordered edit blocks for one patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchProposal {
    pub blocks: Vec<EditBlock>,
}

impl PatchProposal {
    pub fn new(blocks: Vec<EditBlock>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Distinct target files in first-seen order.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for block in &self.blocks {
            if !files.contains(&block.file) {
                files.push(block.file.clone());
            }
        }
        files
    }

    /// Reject the whole proposal if any block targets a file outside the
    /// allowlist. No block is ever accepted on its own.
    pub fn check_scope(&self, allowlist: &[String]) -> Result<(), DomainError> {
        let disallowed: Vec<String> = self
            .files()
            .into_iter()
            .filter(|f| !allowlist.contains(f))
            .collect();
        if disallowed.is_empty() {
            Ok(())
        } else {
            Err(DomainError::DisallowedFiles(disallowed.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(" `./src/a.cpp` "), "src/a.cpp");
        assert_eq!(normalize_path("**src/b.h**"), "src/b.h");
    }

    #[test]
    fn test_files_dedup_in_order() {
        let proposal = PatchProposal::new(vec![
            EditBlock::new("b.cpp", "x", "y"),
            EditBlock::new("a.cpp", "x", "y"),
            EditBlock::new("b.cpp", "z", "w"),
        ]);
        assert_eq!(proposal.files(), vec!["b.cpp", "a.cpp"]);
    }

    #[test]
    fn test_disallowed_file_rejects_whole_proposal() {
        let proposal = PatchProposal::new(vec![
            EditBlock::new("src/y.cpp", "old", "new"),
            EditBlock::new("src/x.cpp", "old", "new"),
        ]);
        let allow = vec!["src/y.cpp".to_string()];
        let err = proposal.check_scope(&allow).unwrap_err();
        assert!(matches!(err, DomainError::DisallowedFiles(_)));
        assert_eq!(
            err.to_string(),
            "Patch proposal touches disallowed files: src/x.cpp"
        );
    }

    #[test]
    fn test_allowed_proposal_passes() {
        let proposal = PatchProposal::new(vec![EditBlock::new("src/y.cpp", "a", "b")]);
        assert!(proposal.check_scope(&["src/y.cpp".to_string()]).is_ok());
    }
}
