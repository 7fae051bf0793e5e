//! Repository fetcher: clones a submission repository into a
//! request-scoped working directory.
//!
//! The fetcher is the only component that touches the network. Each fetch
//! allocates a unique temporary directory under the configured workspace
//! root, so concurrent requests never share a clone path; the checkout is
//! removed when the [`WorkingRepository`] is dropped.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::FetchError;

static GIT_URL_RE: OnceLock<Regex> = OnceLock::new();

/// Returns true if `url` looks like a fetchable git reference.
///
/// Mirrors the submission format students are told to use: an https, git@
/// or ssh URL ending in `.git`.
pub fn is_valid_git_url(url: &str) -> bool {
    let re = GIT_URL_RE
        .get_or_init(|| Regex::new(r"^(https://|git@|ssh://)?\S+\.git$").expect("valid pattern"));
    re.is_match(url)
}

/// A freshly cloned repository, alive for the duration of one check.
///
/// Owns the temporary directory backing the checkout; dropping the value
/// removes the clone from disk.
pub struct WorkingRepository {
    checkout: PathBuf,
    _dir: TempDir,
}

impl WorkingRepository {
    /// Path to the cloned repository contents.
    pub fn path(&self) -> &Path {
        &self.checkout
    }
}

impl std::fmt::Debug for WorkingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingRepository")
            .field("checkout", &self.checkout)
            .finish()
    }
}

/// Clones repositories by shelling out to `git`.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    workspace_root: PathBuf,
}

impl GitFetcher {
    /// Creates a fetcher that allocates working directories under `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    /// Fetches `repo_url` into a fresh request-scoped working directory.
    pub async fn fetch(&self, repo_url: &str) -> Result<WorkingRepository, FetchError> {
        if !is_valid_git_url(repo_url) {
            return Err(FetchError::InvalidUrl(repo_url.to_string()));
        }

        std::fs::create_dir_all(&self.workspace_root)?;
        let dir = tempfile::Builder::new()
            .prefix("checkout-")
            .tempdir_in(&self.workspace_root)?;
        let checkout = dir.path().join("repo");

        self.clone_into(repo_url, &checkout).await?;

        Ok(WorkingRepository {
            checkout,
            _dir: dir,
        })
    }

    /// Performs a shallow clone of `repo_url` into `target_dir`.
    ///
    /// Refuses to clone into an existing directory: a stale checkout from a
    /// prior run would silently mix old and new content.
    pub async fn clone_into(&self, repo_url: &str, target_dir: &Path) -> Result<(), FetchError> {
        if target_dir.exists() {
            return Err(FetchError::DirectoryConflict(
                target_dir.display().to_string(),
            ));
        }

        debug!("Cloning {} into {}", repo_url, target_dir.display());

        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(repo_url)
            .arg(target_dir)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::GitUnavailable(e.to_string()),
                _ => FetchError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::CloneFailed {
                url: repo_url.to_string(),
                detail: truncate(stderr.trim(), 500),
            });
        }

        info!(
            "Repository cloned successfully into '{}'",
            target_dir.display()
        );
        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}
