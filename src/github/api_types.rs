//! Serde-deserializable types matching GitHub REST and GraphQL responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::types::{FieldKind, Issue, ProjectField, ProjectSummary};

/// Re-serialize a value through JSON to convert between compatible types.
pub fn reserialize<T: DeserializeOwned>(value: impl Serialize) -> serde_json::Result<T> {
  serde_json::from_value(serde_json::to_value(value)?)
}

// ============================================================================
// REST
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiBranch {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiIssue {
  pub number: u64,
  pub node_id: Option<String>,
  #[serde(default)]
  pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  pub login: String,
}

impl ApiIssue {
  /// Build a domain issue, keeping the full payload alongside.
  pub fn into_issue(self, raw: Value) -> Issue {
    Issue {
      number: self.number,
      node_id: self.node_id.filter(|id| !id.is_empty()),
      html_url: self.html_url,
      raw: Some(raw),
    }
  }
}

// ============================================================================
// GraphQL envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
  pub data: Option<T>,
  #[serde(default)]
  pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
  pub message: String,
}

// ============================================================================
// addProjectV2ItemById
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiAddItemData {
  #[serde(rename = "addProjectV2ItemById")]
  pub add_item: Option<ApiAddItemPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAddItemPayload {
  pub item: Option<ApiNodeId>,
}

#[derive(Debug, Deserialize)]
pub struct ApiNodeId {
  pub id: String,
}

// ============================================================================
// Project fields query
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiProjectFieldsData {
  pub node: Option<ApiProjectNode>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProjectNode {
  pub fields: Option<ApiFieldConnection>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFieldConnection {
  #[serde(default)]
  pub nodes: Vec<Option<ApiFieldNode>>,
}

/// Field types not selected by the query fragments come back as `{}`.
#[derive(Debug, Deserialize)]
pub struct ApiFieldNode {
  pub id: Option<String>,
  pub name: Option<String>,
  pub options: Option<Vec<ApiFieldOption>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFieldOption {
  pub id: String,
  pub name: String,
}

impl ApiProjectFieldsData {
  /// Returns `None` if the project node itself is missing.
  pub fn into_fields(self) -> Option<Vec<ProjectField>> {
    let node = self.node?;
    let nodes = node.fields.map(|f| f.nodes).unwrap_or_default();

    Some(
      nodes
        .into_iter()
        .flatten()
        .filter_map(|field| {
          let (id, name) = (field.id?, field.name?);
          let kind = match field.options {
            Some(options) => FieldKind::SingleSelect {
              options: options
                .into_iter()
                .map(|o| (o.name, o.id))
                .collect::<HashMap<_, _>>(),
            },
            None => FieldKind::Text,
          };
          Some(ProjectField { id, name, kind })
        })
        .collect(),
    )
  }
}

// ============================================================================
// Organization projects query
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiOrgProjectsData {
  pub organization: Option<ApiOrganization>,
}

#[derive(Debug, Deserialize)]
pub struct ApiOrganization {
  #[serde(rename = "projectsV2")]
  pub projects: ApiProjectConnection,
}

#[derive(Debug, Deserialize)]
pub struct ApiProjectConnection {
  #[serde(default)]
  pub nodes: Vec<Option<ApiProjectSummary>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProjectSummary {
  pub id: String,
  pub title: String,
  pub number: u64,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub closed: bool,
}

impl ApiOrgProjectsData {
  /// Returns `None` if the organization does not exist.
  pub fn into_projects(self) -> Option<Vec<ProjectSummary>> {
    let org = self.organization?;
    Some(
      org
        .projects
        .nodes
        .into_iter()
        .flatten()
        .map(|p| ProjectSummary {
          id: p.id,
          title: p.title,
          number: p.number,
          url: p.url,
          closed: p.closed,
        })
        .collect(),
    )
  }
}
