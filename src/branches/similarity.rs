//! Token-order-insensitive string similarity on a 0..=100 scale.

use rapidfuzz::fuzz;

/// Lowercase, turn non-alphanumerics into spaces, sort the tokens.
fn sorted_tokens(s: &str) -> String {
  let cleaned: String = s
    .chars()
    .map(|c| {
      if c.is_alphanumeric() {
        c.to_ascii_lowercase()
      } else {
        ' '
      }
    })
    .collect();
  let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
  tokens.sort_unstable();
  tokens.join(" ")
}

/// Similarity after normalizing case and punctuation and sorting tokens, so
/// "translation-es" and "es translation" score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
  let (a, b) = (sorted_tokens(a), sorted_tokens(b));
  if a.is_empty() || b.is_empty() {
    return 0;
  }
  // Normalized indel similarity, 0.0..=1.0
  let score = fuzz::ratio(a.chars(), b.chars());
  (score * 100.0).round().clamp(0.0, 100.0) as u8
}
