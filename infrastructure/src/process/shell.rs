//! Shell command runner used for the build guard.

use async_trait::async_trait;
use guildhall_application::ports::command_runner::{CommandOutput, CommandRunner};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands with `sh -c` in the repository root.
pub struct ShellCommandRunner {
    working_dir: PathBuf,
}

impl ShellCommandRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        debug!("Running guard command: {}", command);
        let result = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                CommandOutput {
                    code: output.status.code(),
                    output: combined,
                }
            }
            Err(e) => {
                warn!("Failed to spawn `{}`: {}", command, e);
                CommandOutput {
                    code: None,
                    output: format!("Failed to run command: {}", e),
                }
            }
        }
    }
}
