//! Shell command port (build guard)

use async_trait::async_trait;

/// Exit status plus combined stdout/stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the shell in the repository root.
    ///
    /// Spawn failures are reported as a failed [`CommandOutput`].
    async fn run(&self, command: &str) -> CommandOutput;
}
