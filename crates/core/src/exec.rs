// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! External process execution.

use crate::error::ExecError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs an external tool and returns its combined output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `tool` with `args` inside `dir`.
    async fn run(&self, tool: &str, dir: &Path, args: &[String]) -> Result<String, ExecError>;
}

/// [`CommandRunner`] backed by child processes.
///
/// Stdout and stderr are captured and concatenated. When a timeout is set
/// and exceeded, the child and every process in its group are killed.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner with an optional per-run time limit.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, tool: &str, dir: &Path, args: &[String]) -> Result<String, ExecError> {
        debug!(tool, dir = %dir.display(), ?args, "running command");

        let mut command = Command::new(tool);
        command
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The child leads its own group so its descendants can be killed with it.
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| ExecError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
        let pid = child.id();

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    if let Some(pid) = pid {
                        kill_group(pid);
                    }
                    warn!(tool, timeout = ?limit, "command timed out, killed");
                    return Err(ExecError::Timeout {
                        tool: tool.to_string(),
                        timeout: limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ExecError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ExecError::Failed {
                tool: tool.to_string(),
                status: output.status,
                output: combined,
            });
        }
        Ok(combined)
    }
}

/// Kill every process in the group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pid, error = %e, "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
