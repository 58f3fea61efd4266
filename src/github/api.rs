//! Seams to the external services. `GithubClient` implements both traits;
//! tests substitute in-memory fakes.

use async_trait::async_trait;

use super::types::{FieldValue, Issue, NewIssue, ProjectField, ProjectSummary};
use crate::error::Result;

/// Remote repository (REST) operations
#[async_trait]
pub trait RepoApi: Send + Sync {
  async fn list_branches(&self) -> Result<Vec<String>>;

  async fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;

  async fn get_issue(&self, number: u64) -> Result<Issue>;

  /// Check the credential and return the authenticated login.
  async fn validate_token(&self) -> Result<String>;
}

/// Project board (GraphQL) operations
#[async_trait]
pub trait ProjectApi: Send + Sync {
  /// Attach content to a project. Returns the new item id.
  async fn add_item_to_project(&self, project_id: &str, content_id: &str) -> Result<String>;

  async fn project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>>;

  async fn update_item_field(
    &self,
    project_id: &str,
    item_id: &str,
    field_id: &str,
    value: &FieldValue,
  ) -> Result<()>;

  /// Boards owned by organization `org`, for finding a project id.
  async fn list_projects(&self, org: &str) -> Result<Vec<ProjectSummary>>;
}
