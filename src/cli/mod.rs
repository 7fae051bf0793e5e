//! Command-line interface for subcheck.
//!
//! Provides the `check` command (one pipeline run, verdict via exit code)
//! and the `serve` command (HTTP surface).

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
