//! Check runner: executes the task checker as a child process.

mod config;
mod executor;
mod result;

pub use config::CheckerConfig;
pub use executor::{CheckRunner, TIMEOUT_EXIT_CODE};
pub use result::ExecutionResult;
