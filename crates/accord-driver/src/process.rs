use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::HarnessError;

/// Captured result of one subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the process was killed by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    /// stdout and stderr interleaved in arrival order.
    pub log: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

enum Line {
    Out(String),
    Err(String),
}

/// Runs external binaries with a hard timeout, mirroring every output line
/// to `tracing` under the `accord::subprocess` target.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    env: Vec<(String, String)>,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            env: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(
        &self,
        binary: &str,
        dir: &Path,
        args: &[&str],
    ) -> Result<ProcessOutput, HarnessError> {
        info!(binary, ?args, dir = %dir.display(), "running command");

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .current_dir(dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut child = cmd.spawn().map_err(|e| HarnessError::Spawn {
            binary: binary.to_string(),
            source: e,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Internal(format!("{} stdout not captured", binary)))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HarnessError::Internal(format!("{} stderr not captured", binary)))?;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Line>();

        let tx_out = tx.clone();
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx_out.send(Line::Out(line));
            }
        });

        let tx_err = tx.clone();
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx_err.send(Line::Err(line));
            }
        });

        // rx closes once both reader tasks have dropped their senders.
        drop(tx);

        let mut output = ProcessOutput::default();
        let collect = async {
            while let Some(line) = rx.recv().await {
                let (text, sink) = match line {
                    Line::Out(text) => (text, &mut output.stdout),
                    Line::Err(text) => (text, &mut output.stderr),
                };
                debug!(target: "accord::subprocess", "{}", text);
                sink.push_str(&text);
                sink.push('\n');
                output.log.push_str(&text);
                output.log.push('\n');
            }
            // Closing both streams does not mean the process has exited.
            child.wait().await
        };

        let status = match tokio::time::timeout(self.timeout, collect).await {
            Ok(waited) => {
                waited.map_err(|e| HarnessError::Internal(format!("wait {}: {}", binary, e)))?
            }
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(HarnessError::Timeout {
                    binary: binary.to_string(),
                    command: args.first().copied().unwrap_or("").to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        stdout_task.await.ok();
        stderr_task.await.ok();

        output.code = status.code().unwrap_or(-1);
        if output.code != 0 {
            warn!(binary, code = output.code, "command exited non-zero");
        }
        Ok(output)
    }

    /// Like [`run`](Self::run), but a non-zero exit becomes
    /// [`HarnessError::CommandFailed`] carrying the combined log.
    pub async fn run_checked(
        &self,
        binary: &str,
        dir: &Path,
        args: &[&str],
    ) -> Result<ProcessOutput, HarnessError> {
        let output = self.run(binary, dir, args).await?;
        if !output.success() {
            return Err(HarnessError::CommandFailed {
                command: format!("{} {}", binary, args.first().copied().unwrap_or("")),
                code: output.code,
                output: output.log,
            });
        }
        Ok(output)
    }
}
