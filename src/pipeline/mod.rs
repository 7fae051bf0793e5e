//! Reporting gateway: drives one check from request to classified report.
//!
//! Both front ends (CLI and HTTP) call [`Gateway::handle`] and only differ
//! in how they render the returned [`CheckReport`]. One request maps to
//! exactly one fetch + run + classify sequence, synchronous from the
//! caller's perspective.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::{classify, Outcome};
use crate::error::{PipelineError, RequestError};
use crate::fetch::GitFetcher;
use crate::runner::{CheckRunner, CheckerConfig, ExecutionResult};

/// One submission to check, owned by the gateway for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Which validation routine the checker should run.
    pub task_name: String,
    /// Where to fetch the submission from.
    pub repo_url: String,
}

impl CheckRequest {
    /// Creates a request, rejecting empty fields.
    pub fn new(
        task_name: impl Into<String>,
        repo_url: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let task_name = task_name.into();
        let repo_url = repo_url.into();
        if task_name.trim().is_empty() {
            return Err(RequestError::MissingTaskName);
        }
        if repo_url.trim().is_empty() {
            return Err(RequestError::MissingRepoUrl);
        }
        Ok(Self {
            task_name,
            repo_url,
        })
    }
}

/// The classified result of one completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Task that was checked.
    pub task_name: String,
    /// Repository that was checked.
    pub repo_url: String,
    /// Final classification.
    pub outcome: Outcome,
    /// The checker invocation that produced the outcome.
    pub result: ExecutionResult,
    /// Timestamp when the run started.
    pub started_at: DateTime<Utc>,
    /// Timestamp when the run completed.
    pub completed_at: DateTime<Utc>,
}

impl CheckReport {
    /// Exit code for caller-facing payloads: 0 only for a passing
    /// submission, 1 otherwise.
    ///
    /// The gateway's own classification is authoritative here, not the raw
    /// checker exit code.
    pub fn normalized_exit_code(&self) -> i32 {
        if self.outcome.is_success() {
            0
        } else {
            1
        }
    }
}

/// Drives fetch → run → classify for one request at a time.
#[derive(Debug, Clone)]
pub struct Gateway {
    fetcher: GitFetcher,
    runner: CheckRunner,
}

impl Gateway {
    /// Creates a gateway from checker configuration.
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            fetcher: GitFetcher::new(config.workspace_root.clone()),
            runner: CheckRunner::new(config),
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// A failing submission is a normal report; only operational failures
    /// (fetch error, unrunnable checker) are errors. The working directory
    /// is request-scoped and removed before this returns.
    pub async fn handle(&self, request: CheckRequest) -> Result<CheckReport, PipelineError> {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            "Checking task '{}' from {}",
            request.task_name, request.repo_url
        );

        let repo = self.fetcher.fetch(&request.repo_url).await?;
        let result = self.runner.run(&request.task_name, repo.path()).await?;
        let outcome = classify(&result);

        info!(
            "Task '{}' classified as {} in {:?}",
            request.task_name,
            outcome,
            start.elapsed()
        );

        Ok(CheckReport {
            task_name: request.task_name,
            repo_url: request.repo_url,
            outcome,
            result,
            started_at,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn test_request_rejects_empty_fields() {
        assert!(matches!(
            CheckRequest::new("", "https://example.com/r.git"),
            Err(RequestError::MissingTaskName)
        ));
        assert!(matches!(
            CheckRequest::new("0-bank", "  "),
            Err(RequestError::MissingRepoUrl)
        ));
        assert!(CheckRequest::new("0-bank", "https://example.com/r.git").is_ok());
    }

    #[test]
    fn test_normalized_exit_code_follows_outcome() {
        let mut report = CheckReport {
            task_name: "0-bank".into(),
            repo_url: "https://example.com/r.git".into(),
            outcome: Outcome::Success,
            result: ExecutionResult::completed(0, "", ""),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };
        assert_eq!(report.normalized_exit_code(), 0);

        // Even a checker that exited 0 reports 1 once classified as failing.
        report.outcome = Outcome::Timeout;
        assert_eq!(report.normalized_exit_code(), 1);
        report.outcome = Outcome::ValidationFailure;
        assert_eq!(report.normalized_exit_code(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_launches_checker() {
        let dir = tempfile::TempDir::new().unwrap();
        // A checker path that would fail loudly if it were ever spawned.
        let config = CheckerConfig::new(dir.path().join("no-such-checker"))
            .with_workspace_root(dir.path());
        let gateway = Gateway::new(config);

        let request = CheckRequest::new("0-bank", "https://example.com/no-git-suffix").unwrap();
        let err = gateway.handle(request).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Fetch(FetchError::InvalidUrl(_))
        ));
    }
}
