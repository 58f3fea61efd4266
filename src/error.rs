//! Error taxonomy shared by the resolvers, the GitHub client and the linker.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// No credential or source configured. Never falls back.
  #[error("configuration missing: {0}")]
  ConfigurationMissing(String),

  /// A branch, language, issue or project field does not exist.
  #[error("{kind} not found: {name}")]
  NotFound { kind: &'static str, name: String },

  /// Network error, timeout or non-2xx answer from an external call.
  #[error("{context}: {message}")]
  Upstream { context: String, message: String },

  /// Phase 1 or 2 of a link operation failed; nothing was annotated.
  #[error("failed to link issue #{issue} to project: {reason}")]
  FatalLink { issue: u64, reason: String },

  /// Caller-supplied value rejected before any external call.
  #[error("invalid {field}: {message}")]
  Invalid { field: &'static str, message: String },

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: std::io::Error,
  },
}

impl Error {
  pub fn upstream(context: impl Into<String>, message: impl ToString) -> Self {
    Self::Upstream {
      context: context.into(),
      message: message.to_string(),
    }
  }

  pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
    Self::NotFound {
      kind,
      name: name.into(),
    }
  }

  pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
    Self::Invalid {
      field,
      message: message.into(),
    }
  }

  pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
    Self::Io {
      context: context.into(),
      source,
    }
  }

  /// Read paths degrade to cache or static data on these; write paths do not.
  pub fn is_upstream(&self) -> bool {
    matches!(self, Self::Upstream { .. } | Self::Io { .. })
  }
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    let context = match e.url() {
      Some(url) => format!("request to {} failed", url.path()),
      None => "request failed".to_string(),
    };
    Self::upstream(context, e)
  }
}
