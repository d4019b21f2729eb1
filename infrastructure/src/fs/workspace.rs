//! Working tree access rooted at the repository.

use guildhall_application::ports::workspace::{WorkspaceError, WorkspacePort};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Repository working tree on the local filesystem.
///
/// All paths are repository-relative with `/` separators.
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root. Absolute paths and `..` segments are
    /// refused so nothing outside the repository is reachable.
    fn resolve(&self, path: &str) -> Result<PathBuf, WorkspaceError> {
        let escapes = Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.trim().is_empty() {
            return Err(WorkspaceError::OutsideRoot(path.to_string()));
        }
        Ok(self.root.join(path))
    }

    fn io_error(path: &str, source: std::io::Error) -> WorkspaceError {
        WorkspaceError::Io {
            path: path.to_string(),
            source,
        }
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_str()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

impl WorkspacePort for LocalWorkspace {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>, WorkspaceError> {
        self.resolve(pattern)?;
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
        let entries = glob::glob(&full).map_err(|e| WorkspaceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| self.relative(&p))
            .collect();
        files.sort();
        debug!("Glob {} matched {} files", pattern, files.len());
        Ok(files)
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        let full = self.resolve(path).ok()?;
        std::fs::metadata(full).ok().map(|m| m.len())
    }

    fn read(&self, path: &str) -> Result<Option<String>, WorkspaceError> {
        match std::fs::read(self.resolve(path)?) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(path, e)),
        }
    }

    fn write(&self, path: &str, content: &str) -> Result<(), WorkspaceError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Self::io_error(path, e))?;
        }
        std::fs::write(&full, content).map_err(|e| Self::io_error(path, e))
    }

    fn remove(&self, path: &str) -> Result<(), WorkspaceError> {
        match std::fs::remove_file(self.resolve(path)?) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(Self::io_error(path, e)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, LocalWorkspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = LocalWorkspace::new(dir.path());
        ws.write("src/a.cpp", "int a;").unwrap();
        ws.write("src/a.h", "extern int a;").unwrap();
        ws.write("src/gpu/k.comp", "void main() {}").unwrap();
        ws.write("README.md", "readme").unwrap();
        (dir, ws)
    }

    #[test]
    fn test_glob_is_sorted_and_relative() {
        let (_dir, ws) = workspace();
        assert_eq!(
            ws.glob("src/**/*").unwrap(),
            vec!["src/a.cpp", "src/a.h", "src/gpu/k.comp"]
        );
        assert_eq!(ws.glob("src/*.h").unwrap(), vec!["src/a.h"]);
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            ws.glob("src/[.cpp"),
            Err(WorkspaceError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_read_write_remove() {
        let (_dir, ws) = workspace();
        assert!(ws.exists("src/a.cpp"));
        assert!(!ws.exists("src"));
        assert_eq!(ws.read("src/a.cpp").unwrap().as_deref(), Some("int a;"));
        assert_eq!(ws.read("missing.cpp").unwrap(), None);
        assert_eq!(ws.file_size("src/a.cpp"), Some(6));

        ws.remove("src/a.cpp").unwrap();
        ws.remove("src/a.cpp").unwrap();
        assert!(!ws.exists("src/a.cpp"));
    }

    #[test]
    fn test_paths_outside_root_refused() {
        let (dir, ws) = workspace();
        let outside = dir.path().join("..").join("outside.txt");
        let escaping = format!("../{}", outside.file_name().unwrap().to_string_lossy());

        assert!(matches!(
            ws.write(&escaping, "x"),
            Err(WorkspaceError::OutsideRoot(_))
        ));
        assert!(matches!(ws.read("/etc/hostname"), Err(WorkspaceError::OutsideRoot(_))));
        assert!(matches!(ws.glob("../*"), Err(WorkspaceError::OutsideRoot(_))));
        assert!(!ws.exists("src/../../README.md"));
        assert_eq!(ws.file_size("/etc/hostname"), None);
        assert!(!outside.exists());
        assert_eq!(ws.read("./src/a.cpp").unwrap().as_deref(), Some("int a;"));
    }
}
