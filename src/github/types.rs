use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// An issue as returned by the repository API.
#[derive(Debug, Clone)]
pub struct Issue {
  pub number: u64,
  /// Stable GraphQL node id, when the response carried one
  pub node_id: Option<String>,
  pub html_url: String,
  /// The raw response payload
  pub raw: Option<Value>,
}

/// Fields for a new issue
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
  pub title: String,
  pub body: String,
  pub labels: Vec<String>,
}

/// Kind of a project board field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  /// Option name -> option id
  SingleSelect { options: HashMap<String, String> },
}

/// A custom field defined on a project board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectField {
  pub id: String,
  pub name: String,
  pub kind: FieldKind,
}

/// An issue's membership in a project board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItemLink {
  pub item_id: String,
  pub project_id: String,
}

/// A Projects v2 board owned by an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
  pub id: String,
  pub title: String,
  pub number: u64,
  pub url: String,
  pub closed: bool,
}

/// Value payload for a field update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
  Text(String),
  SingleSelectOptionId(String),
}

/// One requested field assignment
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdateRequest {
  pub field_name: String,
  pub value: Value,
}

impl FieldUpdateRequest {
  pub fn new(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      field_name: field_name.into(),
      value: value.into(),
    }
  }

  /// The value as plain text. Strings are used as-is, anything else is
  /// rendered as JSON.
  pub fn text(&self) -> String {
    match &self.value {
      Value::String(s) => s.clone(),
      Value::Null => String::new(),
      other => other.to_string(),
    }
  }
}
