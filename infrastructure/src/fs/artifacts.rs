//! Artifact store over the agents directory.

use guildhall_application::ports::artifact_store::{ArtifactStore, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Documents and run artifacts under `<repo>/.github/agents` (or the
/// configured agents directory). Paths are relative to that directory.
pub struct FsArtifactStore {
    root: PathBuf,
    /// Prefix used when showing paths to people, usually repo-relative.
    display_prefix: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            display_prefix: PathBuf::new(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_display_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.display_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn error(path: &str, source: std::io::Error) -> StoreError {
        StoreError {
            path: path.to_string(),
            source,
        }
    }

    fn ensure_parent(&self, path: &str) -> Result<PathBuf, StoreError> {
        let full = self.full(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Self::error(path, e))?;
        }
        Ok(full)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.full(path)).ok()
    }

    fn exists(&self, path: &str) -> bool {
        self.full(path).exists()
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.ensure_parent(path)?;
        std::fs::write(full, content).map_err(|e| Self::error(path, e))
    }

    fn append(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.ensure_parent(path)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(full)
            .map_err(|e| Self::error(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| Self::error(path, e))
    }

    fn list(&self, dir: &str, suffix: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.full(dir)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|name| name.ends_with(suffix))
            .collect();
        names.sort();
        names
    }

    fn display_path(&self, path: &str) -> String {
        self.display_prefix.join(path).to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_append_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        assert!(!store.exists("town/procedures.md"));
        store.append("town/procedures.md", "one\n").unwrap();
        store.append("town/procedures.md", "two\n").unwrap();
        assert_eq!(store.read("town/procedures.md").as_deref(), Some("one\ntwo\n"));

        store.write("town/procedures.md", "reset\n").unwrap();
        assert_eq!(store.read("town/procedures.md").as_deref(), Some("reset\n"));
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.write("runs/b.md", "").unwrap();
        store.write("runs/a.md", "").unwrap();
        store.write("runs/a.patch", "").unwrap();
        store.write("runs/cache/x.md", "").unwrap();

        assert_eq!(store.list("runs", ".md"), vec!["a.md", "b.md"]);
        assert!(store.list("missing", ".md").is_empty());
    }

    #[test]
    fn test_display_path() {
        let store = FsArtifactStore::new("/tmp/x").with_display_prefix(".github/agents");
        assert_eq!(store.display_path("runs/r.md"), ".github/agents/runs/r.md");
    }
}
