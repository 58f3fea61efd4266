//! Language catalogs: the built-in list and a remotely fetched one.

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::index::{LanguageEntry, LanguageIndex};
use crate::cache::{CacheKey, CacheLayer, CacheSource};
use crate::error::{Error, Result};

/// Languages the content is translated into.
pub const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
  ("en", "English"),
  ("fr", "French"),
  ("es", "Spanish"),
  ("de", "German"),
  ("it", "Italian"),
  ("pt", "Portuguese"),
  ("ja", "Japanese"),
  ("ko", "Korean"),
  ("zh", "Chinese"),
  ("ar", "Arabic"),
  ("fa", "Persian"),
  ("pl", "Polish"),
  ("ru", "Russian"),
  ("nl", "Dutch"),
  ("tr", "Turkish"),
  ("vi", "Vietnamese"),
  ("hi", "Hindi"),
  ("cs", "Czech"),
  ("fi", "Finnish"),
  ("el", "Greek"),
  ("he", "Hebrew"),
  ("hu", "Hungarian"),
  ("id", "Indonesian"),
  ("nb", "Norwegian"),
  ("ro", "Romanian"),
  ("sv", "Swedish"),
  ("th", "Thai"),
  ("uk", "Ukrainian"),
];

/// Stop following `next` links after this many pages.
const MAX_PAGES: usize = 50;

pub fn builtin_index() -> LanguageIndex {
  LanguageIndex::new(BUILTIN_LANGUAGES.iter().copied())
}

/// Upstream that lists `(code, name)` pairs.
#[async_trait]
pub trait LanguageSource: Send + Sync {
  /// Identifies the source in cache keys and logs.
  fn name(&self) -> &str;

  async fn fetch_languages(&self) -> Result<Vec<(String, String)>>;
}

#[derive(Debug, Deserialize)]
struct ApiLanguagePage {
  #[serde(default)]
  results: Vec<ApiLanguage>,
  next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiLanguage {
  code: String,
  name: String,
}

/// `GET {base}/languages`, following `next` links when paged.
pub struct HttpLanguageSource {
  http: reqwest::Client,
  base: String,
  url: Url,
}

impl HttpLanguageSource {
  pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
    let base = base_url.trim_end_matches('/').to_string();
    let url = Url::parse(&format!("{}/languages", base))
      .map_err(|e| Error::invalid("languages.catalog_url", e.to_string()))?;
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| Error::upstream("Failed to create language catalog client", e))?;

    Ok(Self { http, base, url })
  }
}

#[async_trait]
impl LanguageSource for HttpLanguageSource {
  fn name(&self) -> &str {
    &self.base
  }

  async fn fetch_languages(&self) -> Result<Vec<(String, String)>> {
    let mut languages = Vec::new();
    let mut next = Some(self.url.clone());

    for _ in 0..MAX_PAGES {
      let Some(url) = next.take() else {
        break;
      };
      debug!(%url, "fetching languages");

      let response = self.http.get(url).send().await?;
      let status = response.status();
      if !status.is_success() {
        return Err(Error::upstream("Failed to fetch languages", status));
      }
      let page: ApiLanguagePage = response
        .json()
        .await
        .map_err(|e| Error::upstream("Failed to parse languages", e))?;

      languages.extend(page.results.into_iter().map(|l| (l.code, l.name)));
      next = page.next.and_then(|n| Url::parse(&n).ok());
    }

    Ok(languages)
  }
}

/// Remote catalog cached for a day, with the built-in list as fallback.
pub struct RemoteLanguageCatalog {
  source: Arc<dyn LanguageSource>,
  cache: CacheLayer,
  ttl: Duration,
  builtin: Arc<LanguageIndex>,
}

impl RemoteLanguageCatalog {
  pub fn new(source: Arc<dyn LanguageSource>, cache: CacheLayer) -> Self {
    Self {
      source,
      cache,
      ttl: Duration::hours(24),
      builtin: Arc::new(builtin_index()),
    }
  }

  /// The current index. Never fails: any fetch problem yields the built-in
  /// catalog.
  pub async fn index(&self) -> Arc<LanguageIndex> {
    let key = CacheKey::Languages {
      source: self.source.name().to_string(),
    };
    let source = Arc::clone(&self.source);

    let result = self
      .cache
      .fetch(&key, self.ttl, false, || async move {
        let pairs = source.fetch_languages().await?;
        if pairs.is_empty() {
          return Err(Error::upstream("Failed to fetch languages", "catalog is empty"));
        }
        Ok(LanguageIndex::new(pairs))
      })
      .await;

    match result {
      Ok(result) => {
        if result.source == CacheSource::Offline {
          debug!("serving stale language catalog");
        }
        result.data
      }
      Err(e) => {
        warn!(error = %e, "language catalog unavailable, using built-in list");
        Arc::clone(&self.builtin)
      }
    }
  }

  pub async fn search(&self, query: &str, limit: usize) -> Vec<LanguageEntry> {
    self.index().await.search(query, limit)
  }
}

/// Either the built-in catalog or a remote one.
pub enum LanguageCatalog {
  Static(Arc<LanguageIndex>),
  Remote(RemoteLanguageCatalog),
}

impl LanguageCatalog {
  pub fn builtin() -> Self {
    Self::Static(Arc::new(builtin_index()))
  }

  pub async fn index(&self) -> Arc<LanguageIndex> {
    match self {
      Self::Static(index) => Arc::clone(index),
      Self::Remote(remote) => remote.index().await,
    }
  }

  pub async fn search(&self, query: &str, limit: usize) -> Vec<LanguageEntry> {
    self.index().await.search(query, limit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheStore, ManualClock};
  use crate::test_support::FakeLanguageSource;

  fn catalog(source: Arc<FakeLanguageSource>) -> (RemoteLanguageCatalog, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = CacheLayer::new(CacheStore::with_clock(clock.clone()));
    (RemoteLanguageCatalog::new(source, cache), clock)
  }

  #[test]
  fn test_builtin_index() {
    let index = builtin_index();
    assert_eq!(index.len(), 28);
    assert_eq!(index.get("fa").map(|e| e.display.as_str()), Some("Persian (fa)"));
  }

  #[tokio::test]
  async fn test_remote_catalog_cached_for_a_day() {
    let source = Arc::new(FakeLanguageSource::with(&[("qu", "Quechua")]));
    let (catalog, clock) = catalog(source.clone());

    assert_eq!(catalog.search("qu", 5).await[0].code, "qu");
    clock.advance(Duration::hours(23));
    catalog.search("", 5).await;
    assert_eq!(source.calls(), 1);

    clock.advance(Duration::hours(2));
    catalog.search("", 5).await;
    assert_eq!(source.calls(), 2);
  }

  #[tokio::test]
  async fn test_fetch_failure_falls_back_to_builtin() {
    let source = Arc::new(FakeLanguageSource::failing());
    let (catalog, _) = catalog(source);

    let index = catalog.index().await;
    assert_eq!(index.len(), BUILTIN_LANGUAGES.len());
    assert_eq!(catalog.search("es", 1).await[0].code, "es");
  }

  #[tokio::test]
  async fn test_empty_remote_catalog_falls_back_to_builtin() {
    let source = Arc::new(FakeLanguageSource::with(&[]));
    let (catalog, _) = catalog(source);
    assert_eq!(catalog.index().await.len(), BUILTIN_LANGUAGES.len());
  }

  #[tokio::test]
  async fn test_static_catalog() {
    let catalog = LanguageCatalog::builtin();
    assert_eq!(catalog.search("german", 3).await[0].code, "de");
  }

  #[test]
  fn test_language_page_parse() {
    let page: ApiLanguagePage = serde_json::from_str(
      r#"{"count": 2, "next": null, "results": [{"code": "en", "name": "English"}, {"code": "fr", "name": "French"}]}"#,
    )
    .unwrap();
    assert_eq!(page.results.len(), 2);
    assert!(page.next.is_none());
  }
}
