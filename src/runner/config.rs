//! Configuration for checker runs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default wall-clock budget for one checker run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for running the checker against a fetched repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Path to the checker executable.
    pub executable: PathBuf,
    /// Directory under which request-scoped working directories are created.
    pub workspace_root: PathBuf,
    /// Maximum wall-clock time for one checker run.
    pub timeout: Duration,
}

impl CheckerConfig {
    /// Creates a configuration for the given checker executable with defaults.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            workspace_root: PathBuf::from("./workdir"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the workspace root for cloned repositories.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Sets the checker timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
