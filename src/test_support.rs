//! In-memory fakes for the external seams.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::branches::BranchSnapshot;
use crate::error::{Error, Result};
use crate::github::{
  FieldKind, FieldValue, Issue, NewIssue, ProjectApi, ProjectField, ProjectSummary, RepoApi,
};
use crate::languages::LanguageSource;

fn names(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| s.to_string()).collect()
}

pub fn text_field(id: &str, name: &str) -> ProjectField {
  ProjectField {
    id: id.into(),
    name: name.into(),
    kind: FieldKind::Text,
  }
}

pub fn select_field(id: &str, name: &str, options: &[(&str, &str)]) -> ProjectField {
  ProjectField {
    id: id.into(),
    name: name.into(),
    kind: FieldKind::SingleSelect {
      options: options
        .iter()
        .map(|(name, id)| (name.to_string(), id.to_string()))
        .collect::<HashMap<_, _>>(),
    },
  }
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Default)]
pub struct FakeRepo {
  /// `None` makes branch listing fail
  branches: Mutex<Option<Vec<String>>>,
  /// Branch listing answers as if the repository were gone
  missing: AtomicBool,
  issue_node_id: Option<String>,
  fail_create: bool,
  list_calls: AtomicUsize,
  get_issue_calls: AtomicUsize,
  created: Mutex<Vec<NewIssue>>,
}

impl FakeRepo {
  pub fn with_branches(branches: &[&str]) -> Self {
    Self {
      branches: Mutex::new(Some(names(branches))),
      ..Self::default()
    }
  }

  /// Node id returned when an issue is fetched or created.
  pub fn with_issue_node_id(mut self, node_id: &str) -> Self {
    self.issue_node_id = Some(node_id.to_string());
    self
  }

  pub fn failing_create(mut self) -> Self {
    self.fail_create = true;
    self
  }

  pub fn set_branches(&self, branches: Option<&[&str]>) {
    *self.branches.lock().unwrap() = branches.map(names);
  }

  pub fn set_missing(&self, missing: bool) {
    self.missing.store(missing, Ordering::SeqCst);
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn get_issue_calls(&self) -> usize {
    self.get_issue_calls.load(Ordering::SeqCst)
  }

  pub fn created(&self) -> Vec<NewIssue> {
    self.created.lock().unwrap().clone()
  }

  fn issue(&self, number: u64) -> Issue {
    Issue {
      number,
      node_id: self.issue_node_id.clone(),
      html_url: format!("https://github.com/acme/docs/issues/{}", number),
      raw: Some(json!({ "number": number })),
    }
  }
}

#[async_trait]
impl RepoApi for FakeRepo {
  async fn list_branches(&self) -> Result<Vec<String>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    if self.missing.load(Ordering::SeqCst) {
      return Err(Error::not_found("repository", "acme/docs"));
    }
    self
      .branches
      .lock()
      .unwrap()
      .clone()
      .ok_or_else(|| Error::upstream("Failed to list branches", "connection reset"))
  }

  async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
    if self.fail_create {
      return Err(Error::upstream("Failed to create issue", "502 Bad Gateway"));
    }
    let mut created = self.created.lock().unwrap();
    created.push(issue.clone());
    Ok(self.issue(created.len() as u64))
  }

  async fn get_issue(&self, number: u64) -> Result<Issue> {
    self.get_issue_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.issue(number))
  }

  async fn validate_token(&self) -> Result<String> {
    Ok("octocat".to_string())
  }
}

// ============================================================================
// Project board
// ============================================================================

#[derive(Default)]
pub struct FakeProject {
  fields: Vec<ProjectField>,
  /// Organization login -> boards
  projects: HashMap<String, Vec<ProjectSummary>>,
  fail_add: bool,
  fail_fields: bool,
  failing_field_ids: HashSet<String>,
  added: Mutex<Vec<(String, String)>>,
  updates: Mutex<Vec<(String, FieldValue)>>,
  field_queries: AtomicUsize,
}

impl FakeProject {
  pub fn with_fields(fields: Vec<ProjectField>) -> Self {
    Self {
      fields,
      ..Self::default()
    }
  }

  pub fn with_projects(mut self, org: &str, projects: Vec<ProjectSummary>) -> Self {
    self.projects.insert(org.to_string(), projects);
    self
  }

  pub fn failing_add(mut self) -> Self {
    self.fail_add = true;
    self
  }

  pub fn failing_fields(mut self) -> Self {
    self.fail_fields = true;
    self
  }

  pub fn failing_updates_for(mut self, field_id: &str) -> Self {
    self.failing_field_ids.insert(field_id.to_string());
    self
  }

  /// `(project_id, content_id)` per attach call
  pub fn added(&self) -> Vec<(String, String)> {
    self.added.lock().unwrap().clone()
  }

  /// `(field_id, value)` per successful update
  pub fn updates(&self) -> Vec<(String, FieldValue)> {
    self.updates.lock().unwrap().clone()
  }

  pub fn field_queries(&self) -> usize {
    self.field_queries.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ProjectApi for FakeProject {
  async fn add_item_to_project(&self, project_id: &str, content_id: &str) -> Result<String> {
    if self.fail_add {
      return Err(Error::upstream("Failed to add issue to project", "GraphQL errors: nope"));
    }
    let mut added = self.added.lock().unwrap();
    added.push((project_id.to_string(), content_id.to_string()));
    Ok(format!("ITEM_{}", added.len()))
  }

  async fn project_fields(&self, _project_id: &str) -> Result<Vec<ProjectField>> {
    self.field_queries.fetch_add(1, Ordering::SeqCst);
    if self.fail_fields {
      return Err(Error::upstream("Failed to get project fields", "timeout"));
    }
    Ok(self.fields.clone())
  }

  async fn update_item_field(
    &self,
    _project_id: &str,
    _item_id: &str,
    field_id: &str,
    value: &FieldValue,
  ) -> Result<()> {
    if self.failing_field_ids.contains(field_id) {
      return Err(Error::upstream("Failed to update project field", "500"));
    }
    self
      .updates
      .lock()
      .unwrap()
      .push((field_id.to_string(), value.clone()));
    Ok(())
  }

  async fn list_projects(&self, org: &str) -> Result<Vec<ProjectSummary>> {
    self
      .projects
      .get(org)
      .cloned()
      .ok_or_else(|| Error::not_found("organization", org))
  }
}

pub fn board(id: &str, title: &str, number: u64, closed: bool) -> ProjectSummary {
  ProjectSummary {
    id: id.into(),
    title: title.into(),
    number,
    url: format!("https://github.com/orgs/acme/projects/{}", number),
    closed,
  }
}

// ============================================================================
// Local snapshot
// ============================================================================

pub struct FakeSnapshot {
  path: PathBuf,
  branches: Option<Vec<String>>,
  calls: AtomicUsize,
}

impl FakeSnapshot {
  pub fn with_branches(branches: &[&str]) -> Self {
    Self {
      path: PathBuf::from("/srv/content"),
      branches: Some(names(branches)),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn failing() -> Self {
    Self {
      path: PathBuf::from("/srv/missing"),
      branches: None,
      calls: AtomicUsize::new(0),
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl BranchSnapshot for FakeSnapshot {
  fn location(&self) -> &Path {
    &self.path
  }

  async fn list_branches(&self) -> Result<Vec<String>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self
      .branches
      .clone()
      .ok_or_else(|| Error::not_found("git repository", self.path.display().to_string()))
  }
}

// ============================================================================
// Language catalog
// ============================================================================

pub struct FakeLanguageSource {
  languages: Option<Vec<(String, String)>>,
  calls: AtomicUsize,
}

impl FakeLanguageSource {
  pub fn with(languages: &[(&str, &str)]) -> Self {
    Self {
      languages: Some(
        languages
          .iter()
          .map(|(c, n)| (c.to_string(), n.to_string()))
          .collect(),
      ),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn failing() -> Self {
    Self {
      languages: None,
      calls: AtomicUsize::new(0),
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl LanguageSource for FakeLanguageSource {
  fn name(&self) -> &str {
    "fake"
  }

  async fn fetch_languages(&self) -> Result<Vec<(String, String)>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self
      .languages
      .clone()
      .ok_or_else(|| Error::upstream("Failed to fetch languages", "503"))
  }
}
