//! Filesystem adapters: working tree, output cache and artifact store.

pub mod artifacts;
pub mod cache;
pub mod workspace;

pub use artifacts::FsArtifactStore;
pub use cache::FsOutputCache;
pub use workspace::LocalWorkspace;
