//! Child-process execution of the checker with a wall-clock timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::CheckerConfig;
use super::result::ExecutionResult;
use crate::error::EnvironmentError;

/// Exit code reported for a timed-out run.
///
/// Negative so it can never collide with an exit code the checker itself
/// could produce (0..=255 on Unix).
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Runs the checker executable against a fetched repository.
///
/// The checker is an opaque contract: it takes a task name and a repository
/// path, writes progress to stdout and diagnostics to stderr, and exits 0
/// on success. Everything it reports comes back inside an
/// [`ExecutionResult`]; only environment failures (executable missing,
/// permission denied) are errors.
#[derive(Debug, Clone)]
pub struct CheckRunner {
    config: CheckerConfig,
}

impl CheckRunner {
    /// Creates a runner with the given configuration.
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Runs the checker for `task_name` against the repository at `working_dir`.
    ///
    /// Enforces the configured wall-clock timeout: on expiry the child is
    /// killed and reaped, and the partial capture is returned with
    /// `timed_out` set.
    pub async fn run(
        &self,
        task_name: &str,
        working_dir: &Path,
    ) -> Result<ExecutionResult, EnvironmentError> {
        let exe = self.config.executable.display().to_string();
        debug!(
            "Launching checker {} --task-name {} --repo-path {}",
            exe,
            task_name,
            working_dir.display()
        );

        let mut child = Command::new(&self.config.executable)
            .arg("--task-name")
            .arg(task_name)
            .arg("--repo-path")
            .arg(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EnvironmentError::ExecutableNotFound(exe.clone()),
                std::io::ErrorKind::PermissionDenied => {
                    EnvironmentError::PermissionDenied(exe.clone())
                }
                _ => EnvironmentError::Io(e),
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            EnvironmentError::Io(std::io::Error::other("failed to capture checker stdout"))
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            EnvironmentError::Io(std::io::Error::other("failed to capture checker stderr"))
        })?;

        let mut stdout_buf: Vec<u8> = Vec::new();
        let mut stderr_buf: Vec<u8> = Vec::new();

        let start = Instant::now();

        // Capture is buffered in full as raw bytes; the checker may emit
        // arbitrary byte sequences, and runs are short-lived and bounded by
        // the timeout, which keeps the buffers small. On timeout the
        // partial reads stay in the buffers.
        let waited = tokio::time::timeout(self.config.timeout, async {
            let (out_read, err_read) = tokio::join!(
                stdout.read_to_end(&mut stdout_buf),
                stderr.read_to_end(&mut stderr_buf),
            );
            if let Err(e) = out_read {
                warn!("Error reading checker stdout: {}", e);
            }
            if let Err(e) = err_read {
                warn!("Error reading checker stderr: {}", e);
            }

            child.wait().await
        })
        .await;

        let duration = start.elapsed();
        let stdout_content = String::from_utf8_lossy(&stdout_buf).into_owned();
        let stderr_content = String::from_utf8_lossy(&stderr_buf).into_owned();

        match waited {
            Ok(Ok(status)) => {
                let exit_code = exit_status_code(&status);
                info!(
                    "Checker for task '{}' completed in {:?} with exit code {}",
                    task_name, duration, exit_code
                );
                Ok(ExecutionResult::completed(
                    exit_code,
                    stdout_content,
                    stderr_content,
                ))
            }
            Ok(Err(e)) => Err(EnvironmentError::Io(e)),
            Err(_) => {
                // Timeout: kill and reap so no orphaned process survives.
                let _ = child.kill().await;
                warn!(
                    "Checker for task '{}' exceeded timeout {:?}, killed",
                    task_name, self.config.timeout
                );
                Ok(ExecutionResult::timed_out(stdout_content, stderr_content))
            }
        }
    }
}

/// Exit code for a checker that ended on its own.
///
/// A signal-killed checker carries no exit code; it is reported with the
/// shell convention 128 + signal number, keeping [`TIMEOUT_EXIT_CODE`]
/// exclusive to timed-out runs.
#[cfg(unix)]
fn exit_status_code(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(not(unix))]
fn exit_status_code(status: &std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
