//! Outcome classification for checker runs.
//!
//! Classification is a pure function of one [`ExecutionResult`]: the same
//! input always yields the same outcome, and nothing here retries or
//! performs IO.

use serde::{Deserialize, Serialize};

use crate::runner::ExecutionResult;

/// Stderr substrings that mark a submission-side failure.
///
/// Matching checker wording is deliberately coarse: the checker reports
/// freeform text, and these markers separate "the submission is wrong"
/// from "the checker itself broke". Kept in one place so checker wording
/// changes only touch this list.
pub const VALIDATION_MARKERS: [&str; 3] = ["Validation failed", "Missing", "not found"];

/// Final classification of one checking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The checker exited 0; the submission passed.
    Success,
    /// The checker rejected the submission's content.
    ValidationFailure,
    /// The checker itself malfunctioned (crash, missing dependency).
    InfrastructureFailure,
    /// The run exceeded the wall-clock timeout and was killed.
    Timeout,
}

impl Outcome {
    /// Returns true only for a passing submission.
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::ValidationFailure => write!(f, "validation failure"),
            Outcome::InfrastructureFailure => write!(f, "infrastructure failure"),
            Outcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// Classifies one execution result.
///
/// Precedence: timeout first, then semantic-marker matching on stderr for
/// nonzero exits, then infrastructure failure, then success.
pub fn classify(result: &ExecutionResult) -> Outcome {
    if result.timed_out {
        return Outcome::Timeout;
    }
    if result.exit_code != 0 {
        if VALIDATION_MARKERS.iter().any(|m| result.stderr.contains(m)) {
            return Outcome::ValidationFailure;
        }
        return Outcome::InfrastructureFailure;
    }
    Outcome::Success
}
