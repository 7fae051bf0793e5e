//! subcheck: automated grading of student code submissions.
//!
//! Given a task name and a repository URL, subcheck clones the repository,
//! runs the configured task checker against it with a wall-clock timeout,
//! classifies the captured result, and reports a pass/fail verdict to the
//! calling surface (process exit code or HTTP JSON/HTML).

// Core modules
pub mod classify;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod runner;
pub mod server;

// Re-export commonly used error types
pub use error::{EnvironmentError, FetchError, PipelineError, RequestError};
