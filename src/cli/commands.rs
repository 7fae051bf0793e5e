//! CLI command definitions for subcheck.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::classify::Outcome;
use crate::pipeline::{CheckRequest, Gateway};
use crate::runner::CheckerConfig;
use crate::server;

/// Default bind address for `subcheck serve`.
const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// CLI exit code for a passing submission.
const EXIT_SUCCESS: u8 = 0;
/// CLI exit code for a rejected submission.
const EXIT_VALIDATION: u8 = 1;
/// CLI exit code for an operational failure (fetch, checker environment,
/// checker malfunction).
const EXIT_OPERATIONAL: u8 = 2;
/// CLI exit code for a timed-out checker run.
const EXIT_TIMEOUT: u8 = 3;

/// Automated grading of student code submissions.
#[derive(Parser)]
#[command(name = "subcheck")]
#[command(about = "Fetch a submission repository, run its task checker, report the verdict")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Check one submission and report the verdict via the exit code.
    Check(CheckArgs),

    /// Serve the checker over HTTP.
    Serve(ServeArgs),
}

/// Checker configuration shared by both commands.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Path to the checker executable.
    #[arg(long, default_value = "./checker", env = "SUBCHECK_CHECKER")]
    pub checker_exe: PathBuf,

    /// Directory for request-scoped repository checkouts.
    #[arg(long, default_value = "./workdir", env = "SUBCHECK_WORKSPACE")]
    pub workspace_root: PathBuf,

    /// Wall-clock timeout for one checker run, in seconds.
    #[arg(long, default_value = "30", env = "SUBCHECK_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl ConfigArgs {
    fn to_config(&self) -> CheckerConfig {
        CheckerConfig::new(&self.checker_exe)
            .with_workspace_root(&self.workspace_root)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Arguments for `subcheck check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Name of the task to validate.
    #[arg(long)]
    pub task_name: String,

    /// URL of the submission repository.
    #[arg(long)]
    pub repo: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `subcheck serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP surface to.
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Parses CLI arguments from the process environment.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Executes the parsed CLI command.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Check(args) => Ok(ExitCode::from(run_check(args).await)),
        Commands::Serve(args) => {
            server::serve(args.config.to_config(), &args.bind).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_check(args: CheckArgs) -> u8 {
    let gateway = Gateway::new(args.config.to_config());

    let request = match CheckRequest::new(&args.task_name, &args.repo) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Check failed: {e}");
            return EXIT_OPERATIONAL;
        }
    };

    let report = match gateway.handle(request).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Check failed: {e}");
            return EXIT_OPERATIONAL;
        }
    };

    // Relay the checker's streams to the matching channels.
    print!("{}", report.result.stdout);
    eprint!("{}", report.result.stderr);
    std::io::stdout().flush().ok();

    info!(
        "Task '{}' finished with outcome {}",
        report.task_name, report.outcome
    );

    match report.outcome {
        Outcome::Success => {
            println!("Task '{}' passed.", report.task_name);
            EXIT_SUCCESS
        }
        Outcome::ValidationFailure => {
            eprintln!("Task '{}' failed validation.", report.task_name);
            EXIT_VALIDATION
        }
        Outcome::InfrastructureFailure => {
            eprintln!(
                "Checker malfunctioned for task '{}' (exit code {}).",
                report.task_name, report.result.exit_code
            );
            EXIT_OPERATIONAL
        }
        Outcome::Timeout => {
            eprintln!("Checker timed out for task '{}'.", report.task_name);
            EXIT_TIMEOUT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_check_command() {
        let cli = Cli::parse_from([
            "subcheck",
            "check",
            "--task-name",
            "0-bank",
            "--repo",
            "https://github.com/user/repo.git",
            "--timeout-secs",
            "10",
        ]);

        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.task_name, "0-bank");
                assert_eq!(args.repo, "https://github.com/user/repo.git");
                assert_eq!(args.config.timeout_secs, 10);
                assert_eq!(args.config.to_config().timeout, Duration::from_secs(10));
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_cli_parses_serve_command_with_defaults() {
        let cli = Cli::parse_from(["subcheck", "serve"]);

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind, DEFAULT_BIND);
                assert_eq!(args.config.timeout_secs, 30);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[cfg(unix)]
    mod check_exit_codes {
        use super::super::*;
        use std::path::Path;
        use tempfile::TempDir;

        async fn git_available() -> bool {
            tokio::process::Command::new("git")
                .arg("--version")
                .output()
                .await
                .map(|o| o.status.success())
                .unwrap_or(false)
        }

        /// Creates a committed git repository whose path doubles as a
        /// valid submission URL.
        async fn make_submission_repo(parent: &Path) -> std::path::PathBuf {
            let repo = parent.join("src.git");
            std::fs::create_dir(&repo).unwrap();
            std::fs::write(repo.join("0-bank.py"), "class BankAccount:\n    pass\n").unwrap();
            for args in [
                vec!["init"],
                vec!["config", "user.email", "student@test"],
                vec!["config", "user.name", "student"],
                vec!["add", "."],
                vec!["commit", "-m", "submit"],
            ] {
                let out = tokio::process::Command::new("git")
                    .args(&args)
                    .current_dir(&repo)
                    .output()
                    .await
                    .unwrap();
                assert!(out.status.success(), "git {args:?} failed");
            }
            repo
        }

        /// Writes an executable shell script standing in for the checker.
        fn fake_checker(dir: &Path, body: &str) -> std::path::PathBuf {
            use std::os::unix::fs::PermissionsExt;

            let path = dir.join("checker.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn check_args(repo: &str, exe: &Path, workspace: &Path, timeout_secs: u64) -> CheckArgs {
            CheckArgs {
                task_name: "0-bank".to_string(),
                repo: repo.to_string(),
                config: ConfigArgs {
                    checker_exe: exe.to_path_buf(),
                    workspace_root: workspace.to_path_buf(),
                    timeout_secs,
                },
            }
        }

        #[tokio::test]
        async fn fetch_failure_exits_operational_without_launching_checker() {
            let dir = TempDir::new().unwrap();
            // The checker leaves a marker file if it ever runs.
            let exe = fake_checker(dir.path(), "touch \"$(dirname \"$0\")/launched\"");

            // URL fails validation, so the pipeline stops at the fetcher.
            let args = check_args("https://example.com/no-git-suffix", &exe, dir.path(), 30);
            let code = run_check(args).await;

            assert_eq!(code, EXIT_OPERATIONAL);
            assert!(!dir.path().join("launched").exists());
        }

        #[tokio::test]
        async fn passing_submission_exits_zero() {
            if !git_available().await {
                eprintln!("skipping: git not available");
                return;
            }

            let dir = TempDir::new().unwrap();
            let repo = make_submission_repo(dir.path()).await;
            let exe = fake_checker(dir.path(), "echo 'Checker completed successfully.'");

            let args = check_args(&repo.display().to_string(), &exe, dir.path(), 30);
            assert_eq!(run_check(args).await, EXIT_SUCCESS);
        }

        #[tokio::test]
        async fn rejected_submission_exits_validation() {
            if !git_available().await {
                eprintln!("skipping: git not available");
                return;
            }

            let dir = TempDir::new().unwrap();
            let repo = make_submission_repo(dir.path()).await;
            let exe = fake_checker(
                dir.path(),
                "echo 'Missing expected file 1-loops.py' >&2\nexit 1",
            );

            let args = check_args(&repo.display().to_string(), &exe, dir.path(), 30);
            assert_eq!(run_check(args).await, EXIT_VALIDATION);
        }

        #[tokio::test]
        async fn checker_malfunction_exits_operational() {
            if !git_available().await {
                eprintln!("skipping: git not available");
                return;
            }

            let dir = TempDir::new().unwrap();
            let repo = make_submission_repo(dir.path()).await;
            // Nonzero exit with no marker in stderr.
            let exe = fake_checker(dir.path(), "echo 'interpreter exploded' >&2\nexit 70");

            let args = check_args(&repo.display().to_string(), &exe, dir.path(), 30);
            assert_eq!(run_check(args).await, EXIT_OPERATIONAL);
        }

        #[tokio::test]
        async fn runaway_checker_exits_timeout() {
            if !git_available().await {
                eprintln!("skipping: git not available");
                return;
            }

            let dir = TempDir::new().unwrap();
            let repo = make_submission_repo(dir.path()).await;
            let exe = fake_checker(dir.path(), "sleep 60");

            let mut args = check_args(&repo.display().to_string(), &exe, dir.path(), 30);
            args.config.timeout_secs = 1;
            assert_eq!(run_check(args).await, EXIT_TIMEOUT);
        }
    }
}
