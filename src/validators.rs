//! Checks on caller-supplied values, run before any external call.

use crate::error::{Error, Result};
use crate::project::fields::{ITERATION_OPTIONS, URGENCY_OPTIONS};

/// No spaces and no leading dash.
pub fn validate_branch_name(branch: &str) -> Result<()> {
  if branch.is_empty() {
    return Err(Error::invalid("branch", "branch name cannot be empty"));
  }
  if branch.contains(' ') || branch.starts_with('-') {
    return Err(Error::invalid("branch", format!("'{}' is not a valid branch name", branch)));
  }
  Ok(())
}

/// Two or three lowercase ASCII letters.
pub fn validate_language_code(code: &str) -> Result<()> {
  let valid = matches!(code.len(), 2 | 3) && code.chars().all(|c| c.is_ascii_lowercase());
  if !valid {
    return Err(Error::invalid(
      "language",
      format!("'{}' is not a 2-3 letter lowercase language code", code),
    ));
  }
  Ok(())
}

/// Alphanumerics with optional `-` and `_`.
pub fn validate_course_id(course_id: &str) -> Result<()> {
  let stripped: String = course_id.chars().filter(|c| *c != '-' && *c != '_').collect();
  if stripped.is_empty() || !stripped.chars().all(char::is_alphanumeric) {
    return Err(Error::invalid("course", format!("'{}' is not a valid course id", course_id)));
  }
  Ok(())
}

pub fn validate_iteration(iteration: &str) -> Result<()> {
  if !ITERATION_OPTIONS.contains(&iteration) {
    return Err(Error::invalid(
      "iteration",
      format!("expected one of {}, got '{}'", ITERATION_OPTIONS.join(", "), iteration),
    ));
  }
  Ok(())
}

pub fn validate_urgency(urgency: &str) -> Result<()> {
  if !URGENCY_OPTIONS.contains(&urgency) {
    return Err(Error::invalid(
      "urgency",
      format!("expected one of {}, got '{}'", URGENCY_OPTIONS.join(", "), urgency),
    ));
  }
  Ok(())
}

/// Split `category/name`. The name may itself contain slashes.
pub fn parse_tutorial_path(path: &str) -> Result<(String, String)> {
  match path.split_once('/') {
    Some((category, name)) if !category.is_empty() && !name.is_empty() => {
      Ok((category.to_string(), name.to_string()))
    }
    _ => Err(Error::invalid(
      "tutorial",
      format!("expected 'category/name', got '{}'", path),
    )),
  }
}
