//! Filesystem output cache: one markdown file per fingerprint.

use guildhall_application::ports::output_cache::{CacheError, OutputCache};
use guildhall_domain::Fingerprint;
use std::path::{Path, PathBuf};

/// Cache directory inside the agents directory.
pub const CACHE_DIR: &str = "runs/cache";

/// Entries are keyed by content fingerprint, so concurrent writers of the
/// same key write identical bytes and no locking is needed.
pub struct FsOutputCache {
    dir: PathBuf,
}

impl FsOutputCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn in_agents_dir(agents_dir: &Path) -> Self {
        Self::new(agents_dir.join(CACHE_DIR))
    }

    fn entry(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.md", fingerprint.as_str()))
    }
}

impl OutputCache for FsOutputCache {
    fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        std::fs::read_to_string(self.entry(fingerprint)).ok()
    }

    fn store(&self, fingerprint: &Fingerprint, output: &str) -> Result<(), CacheError> {
        let error = |e: std::io::Error| CacheError {
            fingerprint: fingerprint.short().to_string(),
            message: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(error)?;
        std::fs::write(self.entry(fingerprint), output).map_err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsOutputCache::in_agents_dir(dir.path());
        let fp = Fingerprint::compute("task", "ctx", "Vulkan Guru", "none");

        assert_eq!(cache.lookup(&fp), None);
        cache.store(&fp, "output").unwrap();
        assert_eq!(cache.lookup(&fp).as_deref(), Some("output"));
        assert!(dir.path().join(CACHE_DIR).join(format!("{}.md", fp.as_str())).exists());
    }

    #[test]
    fn test_distinct_fingerprints_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsOutputCache::new(dir.path());
        let a = Fingerprint::compute("task", "ctx", "Vulkan Guru", "none");
        let b = Fingerprint::compute("task", "ctx", "Kernel Expert", "none");
        cache.store(&a, "a").unwrap();
        assert_eq!(cache.lookup(&b), None);
    }
}
