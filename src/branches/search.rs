//! Ranking of branch names against a query.

use super::similarity::token_sort_ratio;

/// Suggested first when the query is empty, in this order.
pub const PREFERRED_BRANCHES: [&str; 3] = ["dev", "main", "master"];

/// Similarity scores must exceed this to be suggested.
pub const SIMILARITY_FLOOR: u8 = 40;

/// Canonical names of per-language working branches.
pub fn language_patterns(language: &str) -> Vec<String> {
  let lang = language.to_lowercase();
  vec![
    format!("{}-initial-upload", lang),
    format!("{}-proofreading", lang),
    format!("{}-translation", lang),
    format!("proofreading-{}", lang),
    format!("translation-{}", lang),
  ]
}

/// Rank `branches` (in resolver order) against `query`, returning at most
/// `limit` names.
///
/// - Empty query: preferred branches, then branches matching a language
///   pattern, then everything else in resolver order
/// - Exact match: that branch, then everything else in resolver order
/// - Otherwise: prefix matches, then substring matches, then similar names
///   above [`SIMILARITY_FLOOR`], each tier case-insensitive and excluding
///   earlier picks
///
/// Equal similarity scores keep resolver order.
pub fn rank_branches(
  branches: &[String],
  query: &str,
  limit: usize,
  language: Option<&str>,
) -> Vec<String> {
  if limit == 0 {
    return Vec::new();
  }

  let mut picked: Vec<&str> = Vec::with_capacity(limit.min(branches.len()));

  if query.is_empty() {
    for preferred in PREFERRED_BRANCHES {
      if branches.iter().any(|b| b == preferred) {
        picked.push(preferred);
      }
    }

    if let Some(language) = language.filter(|l| !l.is_empty()) {
      let patterns = language_patterns(language);
      for branch in branches {
        let lower = branch.to_lowercase();
        if patterns.iter().any(|p| lower.contains(p.as_str())) && !picked.contains(&branch.as_str())
        {
          picked.push(branch);
        }
      }
    }

    for branch in branches {
      if !picked.contains(&branch.as_str()) {
        picked.push(branch);
      }
    }
  } else if branches.iter().any(|b| b == query) {
    picked.push(query);
    picked.extend(branches.iter().map(String::as_str).filter(|b| *b != query));
  } else {
    let q = query.to_lowercase();
    let lowered: Vec<(&str, String)> = branches
      .iter()
      .map(|b| (b.as_str(), b.to_lowercase()))
      .collect();

    for (branch, lower) in &lowered {
      if lower.starts_with(&q) {
        picked.push(*branch);
      }
    }
    for (branch, lower) in &lowered {
      if lower.contains(&q) && !picked.contains(branch) {
        picked.push(*branch);
      }
    }

    if picked.len() < limit {
      let mut scored: Vec<(&str, u8)> = lowered
        .iter()
        .filter(|(branch, _)| !picked.contains(branch))
        .map(|(branch, _)| (*branch, token_sort_ratio(query, branch)))
        .filter(|(_, score)| *score > SIMILARITY_FLOOR)
        .collect();
      // Stable: equal scores stay in resolver order
      scored.sort_by(|a, b| b.1.cmp(&a.1));
      picked.extend(scored.into_iter().map(|(branch, _)| branch));
    }
  }

  picked.truncate(limit);
  picked.into_iter().map(String::from).collect()
}

/// Branches that look related to a language code.
pub fn language_branches(branches: &[String], code: &str) -> Vec<String> {
  if code.is_empty() {
    return Vec::new();
  }
  let patterns = [
    format!("{}-", code),
    format!("-{}-", code),
    format!("-{}", code),
    format!("{}_", code),
    code.to_uppercase(),
  ];

  branches
    .iter()
    .filter(|b| patterns.iter().any(|p| b.contains(p.as_str())))
    .cloned()
    .collect()
}
