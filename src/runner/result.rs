//! Captured output of one checker run.

use serde::{Deserialize, Serialize};

use super::executor::TIMEOUT_EXIT_CODE;

/// Everything one checker invocation produced.
///
/// Immutable after creation; checker-side failures live here as data, not
/// as errors. A timed-out run carries whatever was captured before the
/// process was killed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured diagnostic output.
    pub stderr: String,
    /// Exit code of the checker process, or [`TIMEOUT_EXIT_CODE`] on timeout.
    pub exit_code: i32,
    /// True if the run was terminated by the wall-clock timeout.
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Result of a run that ended on its own.
    pub fn completed(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            timed_out: false,
        }
    }

    /// Result of a run killed by the timeout, with the partial capture.
    pub fn timed_out(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: TIMEOUT_EXIT_CODE,
            timed_out: true,
        }
    }

    /// Returns true if the checker itself reported success.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}
