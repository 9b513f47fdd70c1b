//! Subprocess execution with captured output and a hard timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use ap_core::{Error, Result};

/// Hard wall-clock limit for an engine run: 5 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a successful engine run.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Raw stdout bytes; for a transcode this is the encoded payload.
    pub stdout: Vec<u8>,
    /// Diagnostics (lossy UTF-8). Logged server-side, never sent to clients.
    pub stderr: String,
}

/// Builder for a single engine invocation.
///
/// Stdout and stderr are captured into separate buffers; the run is raced
/// against a timeout, and the subprocess is killed if the timeout expires.
#[derive(Debug, Clone)]
pub struct EngineCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl EngineCommand {
    /// Create a new command for the given engine executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, s: impl Into<String>) -> Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Run the engine, capturing stdout and stderr.
    ///
    /// Launch failure, timeout expiry, and non-zero exit all map to
    /// [`Error::Engine`]; the non-zero-exit message embeds the captured
    /// stderr for server-side diagnosis.
    pub async fn execute(self) -> Result<EngineOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child is killed when the wait future is dropped on
            // timeout; no orphaned engine processes.
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::engine(format!("failed to spawn {}: {e}", self.program.display()))
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::engine(format!("I/O error waiting for engine: {e}")));
            }
            Err(_elapsed) => {
                return Err(Error::engine(format!("timed out after {:?}", self.timeout)));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(Error::engine(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(EngineOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}
