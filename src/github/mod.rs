mod api;
mod api_types;
mod client;
mod types;

pub use api::{ProjectApi, RepoApi};
pub use client::GithubClient;
pub use types::{
  FieldKind, FieldUpdateRequest, FieldValue, Issue, NewIssue, ProjectField, ProjectItemLink,
  ProjectSummary,
};
