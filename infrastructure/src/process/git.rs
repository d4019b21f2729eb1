//! `git` command-line adapter.

use async_trait::async_trait;
use guildhall_application::ports::version_control::{VcsError, VersionControl};
use guildhall_domain::patch::numstat_paths;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Runs `git` in the repository root.
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.repo_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, VcsError> {
        let label = format!("git {}", args.join(" "));
        debug!("Running {}", label);
        let spawn_error = |e: std::io::Error| VcsError::Spawn {
            command: label.clone(),
            message: e.to_string(),
        };

        let mut cmd = self.command(args);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        let mut child = cmd.spawn().map_err(spawn_error)?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(input.as_bytes()).await.map_err(spawn_error)?;
            // Closing stdin signals end of patch.
            drop(pipe);
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(VcsError::Failed {
                command: label,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn with_paths<'a>(base: &[&'a str], paths: &'a [String]) -> Vec<&'a str> {
        let mut args = base.to_vec();
        args.push("--");
        args.extend(paths.iter().map(String::as_str));
        args
    }
}

fn with_newline(patch: &str) -> String {
    let mut body = patch.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    body
}

#[async_trait]
impl VersionControl for GitCli {
    async fn diff(&self, paths: &[String]) -> Result<String, VcsError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        self.run(&Self::with_paths(&["diff"], paths), None).await
    }

    async fn numstat(&self, paths: &[String]) -> Result<String, VcsError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        self.run(&Self::with_paths(&["diff", "--numstat"], paths), None)
            .await
    }

    async fn patch_paths(&self, patch: &str) -> Result<Vec<String>, VcsError> {
        let output = self
            .run(&["apply", "--numstat", "-z", "-"], Some(&with_newline(patch)))
            .await?;
        Ok(numstat_paths(&output))
    }

    async fn apply(&self, patch: &str) -> Result<(), VcsError> {
        self.run(&["apply", "--whitespace=fix", "-"], Some(&with_newline(patch)))
            .await
            .map(|_| ())
    }
}
