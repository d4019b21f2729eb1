//! Child-process adapters: `git` and the build guard shell.

pub mod git;
pub mod shell;

pub use git::GitCli;
pub use shell::ShellCommandRunner;
