//! Project board field names and the values the board expects.

use std::collections::HashMap;

use crate::github::{FieldUpdateRequest, ProjectField};

pub const STATUS: &str = "Status";
pub const LANGUAGE: &str = "Language";
pub const ITERATION: &str = "Iteration";
pub const URGENCY: &str = "Urgency";
pub const CONTENT_TYPE: &str = "Content Type";

pub const STATUS_TODO: &str = "Todo";
pub const ITERATION_OPTIONS: [&str; 3] = ["1st", "2nd", "3rd"];
pub const URGENCY_OPTIONS: [&str; 2] = ["not urgent", "urgent"];

/// Other names a board may use for a logical field, tried in order.
pub fn alternative_names(field_name: &str) -> &'static [&'static str] {
  match field_name {
    CONTENT_TYPE => &["ContentType", "Content type", "content type", "Type"],
    STATUS => &["status", "STATE", "State"],
    LANGUAGE => &["language", "Lang"],
    ITERATION => &["iteration"],
    URGENCY => &["urgency"],
    _ => &[],
  }
}

/// Board fields indexed by name. Built per link operation.
#[derive(Debug, Default)]
pub struct FieldSchema {
  by_name: HashMap<String, ProjectField>,
}

impl FieldSchema {
  pub fn new(fields: Vec<ProjectField>) -> Self {
    Self {
      by_name: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty()
  }

  /// Look a field up by name, then by its alternative names.
  pub fn resolve(&self, field_name: &str) -> Option<&ProjectField> {
    self.by_name.get(field_name).or_else(|| {
      alternative_names(field_name)
        .iter()
        .find_map(|alt| self.by_name.get(*alt))
    })
  }
}

/// The fields every new content issue starts with.
pub fn default_fields(
  content_type: &str,
  language: &str,
  iteration: &str,
  urgency: &str,
) -> Vec<FieldUpdateRequest> {
  vec![
    FieldUpdateRequest::new(STATUS, STATUS_TODO),
    FieldUpdateRequest::new(LANGUAGE, language),
    FieldUpdateRequest::new(ITERATION, iteration),
    FieldUpdateRequest::new(URGENCY, urgency),
    FieldUpdateRequest::new(CONTENT_TYPE, content_type),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::github::FieldKind;

  fn field(id: &str, name: &str) -> ProjectField {
    ProjectField {
      id: id.into(),
      name: name.into(),
      kind: FieldKind::Text,
    }
  }

  #[test]
  fn test_exact_name_wins_over_alternative() {
    let schema = FieldSchema::new(vec![field("a", "Type"), field("b", "Content Type")]);
    assert_eq!(schema.resolve(CONTENT_TYPE).unwrap().id, "b");
  }

  #[test]
  fn test_alternatives_tried_in_order() {
    let schema = FieldSchema::new(vec![field("a", "Type"), field("b", "content type")]);
    assert_eq!(schema.resolve(CONTENT_TYPE).unwrap().id, "b");
  }

  #[test]
  fn test_unknown_field() {
    let schema = FieldSchema::new(vec![field("a", "Title")]);
    assert!(schema.resolve("Estimate").is_none());
    assert!(schema.resolve(STATUS).is_none());
  }

  #[test]
  fn test_default_fields() {
    let fields = default_fields("Course", "it", "1st", "urgent");
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], FieldUpdateRequest::new("Status", "Todo"));
    assert_eq!(fields[4], FieldUpdateRequest::new("Content Type", "Course"));
  }
}
