//! Subprocess execution with captured output

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Result of a subprocess execution
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Process exit code (-1 if terminated by a signal)
    pub exit_code: i32,

    /// Execution duration
    pub duration: Duration,
}

impl ProcessOutput {
    /// Create a ProcessOutput from already known values
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            duration: Duration::ZERO,
        }
    }

    fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
            duration,
        }
    }

    /// Whether the process exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Copy the captured output to the standard output and error streams
    pub fn echo(&self) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(self.stdout.as_bytes());
        let _ = out.flush();
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(self.stderr.as_bytes());
        let _ = err.flush();
    }
}

/// Run a command, capturing its output
///
/// A non-zero exit code is not an error: it is recorded in the returned
/// [`ProcessOutput`]. Only failing to spawn the process is.
pub fn run_command<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<ProcessOutput> {
    let program = program.as_ref();
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute {}", program.to_string_lossy()))?;

    let result = ProcessOutput::from_status(
        output.status,
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        start.elapsed(),
    );

    tracing::debug!(
        "command `{} {}` exited with {} after {:.2?}",
        program.to_string_lossy(),
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" "),
        result.exit_code,
        result.duration
    );
    for line in result.stdout.lines() {
        tracing::debug!("(stdout) {}", line);
    }
    for line in result.stderr.lines() {
        tracing::debug!("(stderr) {}", line);
    }

    Ok(result)
}
