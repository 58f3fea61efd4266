use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

use super::search::{language_branches, rank_branches};
use super::snapshot::BranchSnapshot;
use crate::cache::{CacheKey, CacheLayer, CacheSource, QueryKey};
use crate::error::Error;
use crate::github::RepoApi;

/// Served when the remote API fails and nothing was ever fetched.
pub const FALLBACK_BRANCHES: [&str; 2] = ["dev", "main"];

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Where a branch list came from. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOrigin {
  Local,
  Remote,
  /// Remote failed, serving the last good remote list
  RemoteStale,
  Fallback,
}

/// Extra hints that bias suggestions.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
  pub language: Option<String>,
}

impl SearchContext {
  pub fn for_language(language: impl Into<String>) -> Self {
    Self {
      language: Some(language.into()),
    }
  }
}

/// Resolves candidate branch names from a local checkout or the remote API.
pub struct BranchResolver {
  snapshot: Option<Arc<dyn BranchSnapshot>>,
  remote: Arc<dyn RepoApi>,
  remote_key: CacheKey,
  cache: CacheLayer,
  local_ttl: Duration,
  remote_ttl: Duration,
}

impl BranchResolver {
  pub fn new(remote: Arc<dyn RepoApi>, remote_key: CacheKey, cache: CacheLayer) -> Self {
    Self {
      snapshot: None,
      remote,
      remote_key,
      cache,
      local_ttl: Duration::minutes(1),
      remote_ttl: Duration::minutes(5),
    }
  }

  /// Prefer branches listed from a local snapshot.
  pub fn with_snapshot(mut self, snapshot: Arc<dyn BranchSnapshot>) -> Self {
    self.snapshot = Some(snapshot);
    self
  }

  /// All candidate branch names in resolver order. Never fails: degrades to
  /// the last good remote list, then to [`FALLBACK_BRANCHES`].
  pub async fn get_branches(&self, force_refresh: bool) -> Arc<Vec<String>> {
    let (branches, origin) = self.resolve(force_refresh).await;
    debug!(?origin, count = branches.len(), "resolved branches");
    branches
  }

  async fn resolve(&self, force_refresh: bool) -> (Arc<Vec<String>>, BranchOrigin) {
    if let Some(branches) = self.local_branches().await {
      return (branches, BranchOrigin::Local);
    }

    let remote = Arc::clone(&self.remote);
    let result = self
      .cache
      .fetch(&self.remote_key, self.remote_ttl, force_refresh, || async move {
        // Any failed listing degrades, a vanished repository included
        remote.list_branches().await.map_err(|e| match e {
          Error::NotFound { .. } => Error::upstream("Failed to list branches", e),
          other => other,
        })
      })
      .await;

    match result {
      Ok(result) if result.source == CacheSource::Offline => (result.data, BranchOrigin::RemoteStale),
      Ok(result) => (result.data, BranchOrigin::Remote),
      Err(e) => {
        warn!(error = %e, "failed to fetch branches, using fallback list");
        let fallback = FALLBACK_BRANCHES.iter().map(|b| b.to_string()).collect();
        (Arc::new(fallback), BranchOrigin::Fallback)
      }
    }
  }

  /// Branches from the local snapshot, or `None` if there is no snapshot,
  /// it cannot be read, or it lists nothing.
  async fn local_branches(&self) -> Option<Arc<Vec<String>>> {
    let snapshot = self.snapshot.as_ref()?;
    let key = CacheKey::LocalBranches {
      repo_path: snapshot.location().to_path_buf(),
    };
    let hash = key.cache_hash();
    let store = self.cache.store();

    if let Some(cached) = store.get::<Vec<String>>(&hash) {
      return (!cached.is_empty()).then_some(cached);
    }

    match snapshot.list_branches().await {
      Ok(branches) => {
        let branches = Arc::new(branches);
        store.set_shared(&hash, Arc::clone(&branches), self.local_ttl);
        if branches.is_empty() {
          debug!(query = %key.description(), "local snapshot has no branches");
          None
        } else {
          Some(branches)
        }
      }
      Err(e) => {
        warn!(query = %key.description(), error = %e, "local snapshot unavailable");
        None
      }
    }
  }

  /// Ranked suggestions for `query`, at most `limit` long.
  pub async fn fuzzy_search(
    &self,
    query: &str,
    limit: usize,
    context: Option<&SearchContext>,
  ) -> Vec<String> {
    let branches = self.get_branches(false).await;
    let language = context.and_then(|c| c.language.as_deref());
    rank_branches(&branches, query, limit, language)
  }

  pub async fn branch_exists(&self, name: &str) -> bool {
    self.get_branches(false).await.iter().any(|b| b == name)
  }

  /// Branches whose names suggest they belong to `code`.
  pub async fn language_branches(&self, code: &str) -> Vec<String> {
    let branches = self.get_branches(false).await;
    language_branches(&branches, code)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheStore, ManualClock};
  use crate::test_support::{FakeRepo, FakeSnapshot};

  struct Harness {
    resolver: BranchResolver,
    repo: Arc<FakeRepo>,
    clock: Arc<ManualClock>,
  }

  fn harness(remote: &[&str], snapshot: Option<Arc<FakeSnapshot>>) -> Harness {
    let clock = Arc::new(ManualClock::default());
    let cache = CacheLayer::new(CacheStore::with_clock(clock.clone()));
    let repo = Arc::new(FakeRepo::with_branches(remote));
    let key = CacheKey::RemoteBranches {
      owner: "acme".into(),
      repo: "docs".into(),
    };
    let mut resolver = BranchResolver::new(repo.clone(), key, cache);
    if let Some(snapshot) = snapshot {
      resolver = resolver.with_snapshot(snapshot);
    }
    Harness {
      resolver,
      repo,
      clock,
    }
  }

  #[tokio::test]
  async fn test_remote_list_is_cached_for_five_minutes() {
    let h = harness(&["dev", "main"], None);

    h.resolver.get_branches(false).await;
    h.clock.advance(Duration::minutes(4));
    h.resolver.get_branches(false).await;
    assert_eq!(h.repo.list_calls(), 1);

    h.clock.advance(Duration::minutes(2));
    h.resolver.get_branches(false).await;
    assert_eq!(h.repo.list_calls(), 2);
  }

  #[tokio::test]
  async fn test_force_refresh_hits_remote() {
    let h = harness(&["dev"], None);
    h.resolver.get_branches(false).await;
    h.repo.set_branches(Some(&["dev", "new"]));

    let branches = h.resolver.get_branches(true).await;
    assert_eq!(branches.as_slice(), ["dev", "new"]);
    assert_eq!(h.repo.list_calls(), 2);
  }

  #[tokio::test]
  async fn test_remote_failure_serves_last_good_list() {
    let h = harness(&["dev", "es-translation"], None);
    h.resolver.get_branches(false).await;
    h.repo.set_branches(None);

    let branches = h.resolver.get_branches(true).await;
    assert_eq!(branches.as_slice(), ["dev", "es-translation"]);
  }

  #[tokio::test]
  async fn test_not_found_after_good_fetch_serves_last_good_list() {
    let h = harness(&["dev", "es-translation", "main"], None);
    h.resolver.get_branches(false).await;
    h.repo.set_missing(true);

    let branches = h.resolver.get_branches(true).await;
    assert_eq!(branches.as_slice(), ["dev", "es-translation", "main"]);
    assert_eq!(h.repo.list_calls(), 2);
  }

  #[tokio::test]
  async fn test_remote_failure_without_history_uses_static_fallback() {
    let h = harness(&[], None);
    h.repo.set_branches(None);

    let branches = h.resolver.get_branches(false).await;
    assert_eq!(branches.as_slice(), ["dev", "main"]);
  }

  #[tokio::test]
  async fn test_local_snapshot_preferred_over_remote() {
    let snapshot = Arc::new(FakeSnapshot::with_branches(&["dev", "local-only"]));
    let h = harness(&["dev", "remote-only"], Some(snapshot.clone()));

    let branches = h.resolver.get_branches(false).await;
    assert_eq!(branches.as_slice(), ["dev", "local-only"]);
    assert_eq!(h.repo.list_calls(), 0);

    // Cached for a minute
    h.clock.advance(Duration::seconds(30));
    h.resolver.get_branches(false).await;
    assert_eq!(snapshot.calls(), 1);

    h.clock.advance(Duration::seconds(31));
    h.resolver.get_branches(false).await;
    assert_eq!(snapshot.calls(), 2);
  }

  #[tokio::test]
  async fn test_empty_local_snapshot_falls_through_to_remote() {
    let snapshot = Arc::new(FakeSnapshot::with_branches(&[]));
    let h = harness(&["dev", "remote-only"], Some(snapshot));

    let branches = h.resolver.get_branches(false).await;
    assert_eq!(branches.as_slice(), ["dev", "remote-only"]);
  }

  #[tokio::test]
  async fn test_unreadable_local_snapshot_falls_through_to_remote() {
    let snapshot = Arc::new(FakeSnapshot::failing());
    let h = harness(&["main"], Some(snapshot));

    assert_eq!(h.resolver.get_branches(false).await.as_slice(), ["main"]);
  }

  #[tokio::test]
  async fn test_fuzzy_search_exact_match_first() {
    let h = harness(&["develop", "main", "dev"], None);
    let ranked = h.resolver.fuzzy_search("dev", DEFAULT_SEARCH_LIMIT, None).await;
    assert_eq!(ranked[0], "dev");
  }

  #[tokio::test]
  async fn test_fuzzy_search_with_language_context() {
    let h = harness(&["main", "a", "it-proofreading", "dev"], None);
    let context = SearchContext::for_language("it");
    let ranked = h.resolver.fuzzy_search("", 3, Some(&context)).await;
    assert_eq!(ranked, vec!["dev", "main", "it-proofreading"]);
  }

  #[tokio::test]
  async fn test_branch_exists() {
    let h = harness(&["dev", "main"], None);
    assert!(h.resolver.branch_exists("main").await);
    assert!(!h.resolver.branch_exists("Main").await);
    assert_eq!(h.repo.list_calls(), 1);
  }

  #[tokio::test]
  async fn test_language_branches() {
    let h = harness(&["dev", "fr-translation", "es-translation"], None);
    assert_eq!(h.resolver.language_branches("fr").await, vec!["fr-translation"]);
  }
}
