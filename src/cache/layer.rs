//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{DateTime, Duration, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::store::CacheStore;
use super::traits::{CacheResult, QueryKey};
use crate::error::Result;

type Shared = Arc<dyn Any + Send + Sync>;

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between a resolver and its upstream source. Besides the TTL store it
/// remembers the last successfully fetched value per key so a failing
/// upstream can still be served (offline mode).
#[derive(Clone)]
pub struct CacheLayer {
  store: CacheStore,
  last_good: Arc<Mutex<HashMap<String, (Shared, DateTime<Utc>)>>>,
}

impl CacheLayer {
  pub fn new(store: CacheStore) -> Self {
    Self {
      store,
      last_good: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn store(&self) -> &CacheStore {
    &self.store
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Unless `force_refresh`, return a live cache entry
  /// 2. Otherwise fetch from upstream and cache for `ttl`
  /// 3. On upstream failure, return the last good value (offline mode)
  /// 4. With nothing to fall back on, return the upstream error
  pub async fn fetch<K, T, F, Fut>(
    &self,
    key: &K,
    ttl: Duration,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<T>>>
  where
    K: QueryKey,
    T: Any + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let hash = key.cache_hash();

    if !force_refresh {
      if let Some(cached) = self.store.get::<T>(&hash) {
        debug!(query = %key.description(), "cache hit");
        return Ok(CacheResult::from_cache(cached));
      }
    }

    match fetcher().await {
      Ok(data) => {
        let data = Arc::new(data);
        self.store.set_shared(&hash, Arc::clone(&data), ttl);
        self.remember(&hash, Arc::clone(&data));
        debug!(query = %key.description(), "fetched from upstream");
        Ok(CacheResult::from_network(data))
      }
      Err(e) if e.is_upstream() => match self.last_good::<T>(&hash) {
        Some((data, fetched_at)) => {
          warn!(query = %key.description(), error = %e, "upstream failed, serving last good value");
          Ok(CacheResult::offline(data, fetched_at))
        }
        None => Err(e),
      },
      Err(e) => Err(e),
    }
  }

  /// Drop both the live entry and the remembered fallback for `key`.
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    let hash = key.cache_hash();
    self.store.delete(&hash);
    self
      .last_good
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .remove(&hash);
  }

  fn remember<T: Any + Send + Sync>(&self, hash: &str, data: Arc<T>) {
    let now = self.store.now();
    self
      .last_good
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(hash.to_string(), (data as Shared, now));
  }

  fn last_good<T: Any + Send + Sync>(&self, hash: &str) -> Option<(Arc<T>, DateTime<Utc>)> {
    let last_good = self.last_good.lock().unwrap_or_else(|e| e.into_inner());
    let (value, fetched_at) = last_good.get(hash)?;
    let value = Arc::clone(value).downcast::<T>().ok()?;
    Some((value, *fetched_at))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::clock::ManualClock;
  use crate::cache::traits::CacheSource;
  use crate::cache::CacheKey;
  use crate::error::Error;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn layer() -> (CacheLayer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    (CacheLayer::new(CacheStore::with_clock(clock.clone())), clock)
  }

  fn key() -> CacheKey {
    CacheKey::Languages {
      source: "https://example.test".into(),
    }
  }

  #[tokio::test]
  async fn test_second_fetch_is_served_from_cache() {
    let (layer, _) = layer();
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
      layer
        .fetch(&key(), Duration::minutes(5), false, || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(vec![1u32])
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_force_refresh_bypasses_cache() {
    let (layer, _) = layer();
    let first = layer
      .fetch(&key(), Duration::minutes(5), false, || async { Ok(1u32) })
      .await
      .unwrap();
    let second = layer
      .fetch(&key(), Duration::minutes(5), true, || async { Ok(2u32) })
      .await
      .unwrap();

    assert_eq!(*first.data, 1);
    assert_eq!(*second.data, 2);
    assert_eq!(second.source, CacheSource::Network);
  }

  #[tokio::test]
  async fn test_upstream_failure_serves_last_good_after_expiry() {
    let (layer, clock) = layer();
    layer
      .fetch(&key(), Duration::minutes(5), false, || async { Ok(7u32) })
      .await
      .unwrap();
    clock.advance(Duration::minutes(10));

    let result = layer
      .fetch(&key(), Duration::minutes(5), false, || async {
        Err::<u32, _>(Error::upstream("list", "timeout"))
      })
      .await
      .unwrap();

    assert_eq!(*result.data, 7);
    assert_eq!(result.source, CacheSource::Offline);
    assert!(result.fetched_at.is_some());
  }

  #[tokio::test]
  async fn test_upstream_failure_without_fallback_is_error() {
    let (layer, _) = layer();
    let result = layer
      .fetch(&key(), Duration::minutes(5), false, || async {
        Err::<u32, _>(Error::upstream("list", "timeout"))
      })
      .await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_non_upstream_error_is_not_masked() {
    let (layer, _) = layer();
    layer
      .fetch(&key(), Duration::seconds(1), false, || async { Ok(1u32) })
      .await
      .unwrap();

    let result = layer
      .fetch(&key(), Duration::seconds(1), true, || async {
        Err::<u32, _>(Error::ConfigurationMissing("token".into()))
      })
      .await;

    assert!(matches!(result, Err(Error::ConfigurationMissing(_))));
  }

  #[tokio::test]
  async fn test_invalidate_forgets_last_good() {
    let (layer, _) = layer();
    layer
      .fetch(&key(), Duration::minutes(5), false, || async { Ok(1u32) })
      .await
      .unwrap();
    layer.invalidate(&key());

    let result = layer
      .fetch(&key(), Duration::minutes(5), false, || async {
        Err::<u32, _>(Error::upstream("list", "down"))
      })
      .await;
    assert!(result.is_err());
  }
}
