//! Cache keys for the resolvers.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::traits::QueryKey;

#[derive(Clone, Debug)]
pub enum CacheKey {
  /// Branch listing from a local checkout
  LocalBranches { repo_path: PathBuf },
  /// Branch listing from the remote repository API
  RemoteBranches { owner: String, repo: String },
  /// Remote language catalog
  Languages { source: String },
}

impl QueryKey for CacheKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::LocalBranches { repo_path } => format!("local_branches:{}", repo_path.display()),
      Self::RemoteBranches { owner, repo } => {
        format!("remote_branches:{}/{}", owner.to_lowercase(), repo.to_lowercase())
      }
      Self::Languages { source } => format!("languages:{}", source.trim_end_matches('/')),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::LocalBranches { repo_path } => format!("local branches in {}", repo_path.display()),
      Self::RemoteBranches { owner, repo } => format!("branches of {}/{}", owner, repo),
      Self::Languages { source } => format!("languages from {}", source),
    }
  }
}
