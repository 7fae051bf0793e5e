//! Error types for subcheck operations.
//!
//! Defines error types for the major subsystems:
//! - Repository fetching (network, disk, stale directories)
//! - Checker execution environment (missing or unrunnable executable)
//! - Request validation
//! - Pipeline orchestration

use thiserror::Error;

/// Errors that can occur while fetching a repository.
///
/// All fetch failures are terminal; retry policy, if any, belongs to the
/// caller, never to the fetcher itself.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid repository URL '{0}' (expected a fetchable git reference ending in .git)")]
    InvalidUrl(String),

    #[error("Target directory '{0}' already exists; refusing to clone into a stale checkout")]
    DirectoryConflict(String),

    #[error("The git executable is not available: {0}")]
    GitUnavailable(String),

    #[error("Failed to clone '{url}': {detail}")]
    CloneFailed { url: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Environment failures while launching the checker executable.
///
/// These are distinct from task failures: anything the checker itself
/// reports (exit code, streams) is data inside an `ExecutionResult`, not
/// an error.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Checker executable not found at '{0}'")]
    ExecutableNotFound(String),

    #[error("Permission denied running checker executable '{0}'")]
    PermissionDenied(String),

    #[error("IO error running checker: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors constructing a check request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Task name must not be empty")]
    MissingTaskName,

    #[error("Repository URL must not be empty")]
    MissingRepoUrl,
}

/// Operational failures of one pipeline run.
///
/// These never carry a checker verdict: a failing submission is a normal
/// `CheckReport`, while a `PipelineError` means the grading system itself
/// could not complete the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}
