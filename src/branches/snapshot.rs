//! Branch listing from a local checkout.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Source of branch names from a local version-control snapshot.
#[async_trait]
pub trait BranchSnapshot: Send + Sync {
  /// Where the snapshot lives, used for cache keys and logs.
  fn location(&self) -> &Path;

  async fn list_branches(&self) -> Result<Vec<String>>;
}

/// Lists branches of a git working copy with `git branch -a`.
pub struct GitSnapshot {
  repo_path: PathBuf,
}

impl GitSnapshot {
  pub fn new(repo_path: impl Into<PathBuf>) -> Self {
    Self {
      repo_path: repo_path.into(),
    }
  }
}

#[async_trait]
impl BranchSnapshot for GitSnapshot {
  fn location(&self) -> &Path {
    &self.repo_path
  }

  async fn list_branches(&self) -> Result<Vec<String>> {
    if !self.repo_path.join(".git").exists() {
      return Err(Error::not_found(
        "git repository",
        self.repo_path.display().to_string(),
      ));
    }

    debug!(path = %self.repo_path.display(), "listing local branches");

    let output = Command::new("git")
      .args(["branch", "-a", "--no-color"])
      .current_dir(&self.repo_path)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .output()
      .await
      .map_err(|e| Error::io("running git branch", e))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(Error::upstream("git branch failed", stderr.trim()));
    }

    Ok(parse_branch_listing(&String::from_utf8_lossy(
      &output.stdout,
    )))
  }
}

/// Parse `git branch -a` output into sorted, unique bare branch names.
///
/// Drops the current-branch marker, maps `remotes/<remote>/<name>` to
/// `<name>`, and skips the symbolic `HEAD` pointer.
pub fn parse_branch_listing(output: &str) -> Vec<String> {
  let mut names = BTreeSet::new();

  for line in output.lines() {
    let line = line.trim();
    let line = line
      .strip_prefix("* ")
      .or_else(|| line.strip_prefix("+ "))
      .unwrap_or(line)
      .trim();

    if line.is_empty() || line.starts_with('(') {
      // "(HEAD detached at ...)"
      continue;
    }

    // "remotes/origin/HEAD -> origin/dev"
    let line = line.split(" -> ").next().unwrap_or(line);

    let name = match line.strip_prefix("remotes/") {
      Some(rest) => match rest.split_once('/') {
        Some((_remote, name)) => name,
        None => continue,
      },
      None => line,
    };

    if name == "HEAD" || name.is_empty() {
      continue;
    }
    names.insert(name.to_string());
  }

  names.into_iter().collect()
}
