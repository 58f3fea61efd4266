use serde::Serialize;

/// A searchable language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
  pub code: String,
  pub name: String,
  /// "{name} ({code})"
  pub display: String,
  #[serde(skip)]
  search_text: String,
}

impl LanguageEntry {
  pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
    let code = code.into();
    let name = name.into();
    Self {
      display: format!("{} ({})", name, code),
      search_text: format!("{} {}", name.to_lowercase(), code.to_lowercase()),
      code,
      name,
    }
  }

  /// Rank of this entry for an already lowercased, non-empty query.
  /// `None` if the query does not occur in name or code.
  fn score(&self, q: &str) -> Option<u8> {
    if !self.search_text.contains(q) {
      return None;
    }
    let code = self.code.to_lowercase();
    let name = self.name.to_lowercase();

    Some(if code == q {
      100
    } else if code.starts_with(q) {
      90
    } else if name.starts_with(q) {
      80
    } else if name.contains(q) {
      70
    } else {
      60
    })
  }
}

/// Searchable catalog built once from `(code, name)` pairs.
#[derive(Debug, Clone, Default)]
pub struct LanguageIndex {
  entries: Vec<LanguageEntry>,
}

impl LanguageIndex {
  pub fn new<I, C, N>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (C, N)>,
    C: Into<String>,
    N: Into<String>,
  {
    Self {
      entries: pairs
        .into_iter()
        .map(|(code, name)| LanguageEntry::new(code, name))
        .collect(),
    }
  }

  pub fn entries(&self) -> &[LanguageEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[cfg(test)]
  pub(crate) fn get(&self, code: &str) -> Option<&LanguageEntry> {
    self.entries.iter().find(|e| e.code == code)
  }

  /// Ranked matches for `query`. An empty query lists the catalog in order.
  /// Equal scores keep catalog order. Whitespace in the query is kept.
  pub fn search(&self, query: &str, limit: usize) -> Vec<LanguageEntry> {
    let q = query.to_lowercase();
    if q.is_empty() {
      return self.entries.iter().take(limit).cloned().collect();
    }

    let mut scored: Vec<(&LanguageEntry, u8)> = self
      .entries
      .iter()
      .filter_map(|e| e.score(&q).map(|score| (e, score)))
      .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
      .into_iter()
      .take(limit)
      .map(|(e, _)| e.clone())
      .collect()
  }
}
