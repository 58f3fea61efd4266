//! In-memory TTL key/value store.

use chrono::{DateTime, Duration, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;
use tracing::debug;

use super::clock::{Clock, SystemClock};

type Shared = Arc<dyn Any + Send + Sync>;

struct CacheEntry {
  value: Shared,
  expires_at: DateTime<Utc>,
}

/// Concurrency-safe TTL cache.
///
/// Values are stored behind `Arc` so readers get an immutable snapshot and a
/// writer replaces the whole value in one step. An entry whose expiry has
/// passed is indistinguishable from a missing one and is dropped on read.
#[derive(Clone)]
pub struct CacheStore {
  entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
  clock: Arc<dyn Clock>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self::with_clock(Arc::new(SystemClock))
  }

  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
      clock,
    }
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Get a live value. Returns `None` for missing, expired, or differently
  /// typed entries.
  pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
    let now = self.clock.now();
    let mut entries = self.lock();

    let expired = match entries.get(key) {
      Some(entry) => now >= entry.expires_at,
      None => return None,
    };

    if expired {
      entries.remove(key);
      return None;
    }

    entries
      .get(key)
      .and_then(|entry| Arc::clone(&entry.value).downcast::<T>().ok())
  }

  pub fn set<T: Any + Send + Sync>(&self, key: &str, value: T, ttl: Duration) {
    self.set_shared(key, Arc::new(value), ttl);
  }

  /// Store an already shared value without copying it.
  pub fn set_shared<T: Any + Send + Sync>(&self, key: &str, value: Arc<T>, ttl: Duration) {
    let expires_at = self.clock.now() + ttl;
    self.lock().insert(
      key.to_string(),
      CacheEntry {
        value: value as Shared,
        expires_at,
      },
    );
  }

  pub fn delete(&self, key: &str) {
    self.lock().remove(key);
  }

  pub fn clear(&self) {
    self.lock().clear();
  }

  /// Remove expired entries. Returns how many were dropped.
  pub fn cleanup_expired(&self) -> usize {
    let now = self.clock.now();
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|_, entry| now < entry.expires_at);
    before - entries.len()
  }

  /// Number of stored entries, expired ones included until they are swept.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Periodically sweep expired entries. The task ends once every handle to
  /// this store has been dropped.
  pub fn spawn_sweeper(&self, period: std::time::Duration) -> JoinHandle<()> {
    let entries: Weak<Mutex<HashMap<String, CacheEntry>>> = Arc::downgrade(&self.entries);
    let clock = Arc::clone(&self.clock);

    tokio::spawn(async move {
      let mut interval = tokio::time::interval(period);
      interval.tick().await;
      loop {
        interval.tick().await;
        let Some(strong) = entries.upgrade() else {
          break;
        };
        let store = CacheStore {
          entries: strong,
          clock: Arc::clone(&clock),
        };
        let removed = store.cleanup_expired();
        if removed > 0 {
          debug!(removed, "swept expired cache entries");
        }
      }
    })
  }
}

impl Default for CacheStore {
  fn default() -> Self {
    Self::new()
  }
}
