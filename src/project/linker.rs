use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fields::FieldSchema;
use crate::error::{Error, Result};
use crate::github::{
  FieldKind, FieldUpdateRequest, FieldValue, Issue, ProjectApi, ProjectField, ProjectItemLink,
  RepoApi,
};

/// Why a requested field was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// Neither the name nor any alternative exists on the board
  FieldNotFound,
  /// Single-select field without an option of that name
  UnknownOption(String),
  /// The update mutation failed
  UpdateFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSkip {
  pub field_name: String,
  pub reason: SkipReason,
}

/// Outcome of a successful link operation. Skipped fields are diagnostics,
/// not failures.
#[derive(Debug, Clone)]
pub struct LinkReport {
  pub item: ProjectItemLink,
  /// Requested field names that were written
  pub applied: Vec<String>,
  pub skipped: Vec<FieldSkip>,
}

impl LinkReport {
  pub fn is_complete(&self) -> bool {
    self.skipped.is_empty()
  }
}

/// Attaches issues to a project board and fills in its custom fields.
///
/// Each link runs three phases:
/// 1. Attach: resolve the issue's node id and add it to the project
/// 2. Discover: read the board's field definitions
/// 3. Apply: write each requested field independently
///
/// Phases 1 and 2 are fatal on failure. Phase 3 never fails the operation;
/// unresolved fields, unknown options and failed updates are logged and
/// reported in [`LinkReport::skipped`].
#[derive(Clone)]
pub struct ProjectLinker {
  repo: Arc<dyn RepoApi>,
  project: Arc<dyn ProjectApi>,
}

impl ProjectLinker {
  pub fn new(repo: Arc<dyn RepoApi>, project: Arc<dyn ProjectApi>) -> Self {
    Self { repo, project }
  }

  pub async fn link(
    &self,
    issue: &Issue,
    project_id: &str,
    fields: &[FieldUpdateRequest],
  ) -> Result<LinkReport> {
    let fatal = |reason: String| Error::FatalLink {
      issue: issue.number,
      reason,
    };

    // Phase 1: attach
    let content_id = self.content_id(issue).await?;
    let item_id = self
      .project
      .add_item_to_project(project_id, &content_id)
      .await
      .map_err(|e| fatal(e.to_string()))?;
    let item = ProjectItemLink {
      item_id,
      project_id: project_id.to_string(),
    };
    info!(issue = issue.number, item = %item.item_id, "added issue to project");

    // Phase 2: discover schema
    let schema = self
      .project
      .project_fields(project_id)
      .await
      .map(FieldSchema::new)
      .map_err(|e| fatal(e.to_string()))?;
    debug!(fields = schema.len(), "loaded project fields");

    // Phase 3: apply
    let report = self.apply(item, &schema, fields).await;
    if !report.is_complete() {
      warn!(
        issue = issue.number,
        skipped = report.skipped.len(),
        "some project fields were not set"
      );
    }
    Ok(report)
  }

  /// Node id for `issue`: the direct attribute, then the raw payload, then a
  /// fresh fetch of the issue by number.
  pub async fn content_id(&self, issue: &Issue) -> Result<String> {
    if let Some(id) = direct_node_id(issue) {
      return Ok(id);
    }

    debug!(issue = issue.number, "issue has no node id, fetching it");
    match self.repo.get_issue(issue.number).await {
      Ok(fetched) => {
        if let Some(id) = direct_node_id(&fetched) {
          return Ok(id);
        }
      }
      Err(e) => warn!(issue = issue.number, error = %e, "failed to fetch issue"),
    }

    Err(Error::FatalLink {
      issue: issue.number,
      reason: "unable to resolve the issue's node id".to_string(),
    })
  }

  /// Write each requested field. Never fails as a whole.
  pub async fn apply(
    &self,
    item: ProjectItemLink,
    schema: &FieldSchema,
    fields: &[FieldUpdateRequest],
  ) -> LinkReport {
    let mut applied = Vec::new();
    let mut skipped = Vec::new();
    let mut skip = |field_name: &str, reason: SkipReason| {
      skipped.push(FieldSkip {
        field_name: field_name.to_string(),
        reason,
      })
    };

    for request in fields {
      let name = request.field_name.as_str();

      let Some(field) = schema.resolve(name) else {
        warn!(field = name, "field not found in project");
        skip(name, SkipReason::FieldNotFound);
        continue;
      };
      if field.name != name {
        debug!(field = name, using = %field.name, "using alternative field name");
      }

      let Some(value) = field_value(field, request) else {
        let text = request.text();
        warn!(field = name, option = %text, "option not found for field");
        skip(name, SkipReason::UnknownOption(text));
        continue;
      };

      match self
        .project
        .update_item_field(&item.project_id, &item.item_id, &field.id, &value)
        .await
      {
        Ok(()) => applied.push(name.to_string()),
        Err(e) => {
          warn!(field = name, error = %e, "failed to update field");
          skip(name, SkipReason::UpdateFailed(e.to_string()));
        }
      }
    }

    LinkReport {
      item,
      applied,
      skipped,
    }
  }
}

fn direct_node_id(issue: &Issue) -> Option<String> {
  issue
    .node_id
    .clone()
    .filter(|id| !id.is_empty())
    .or_else(|| {
      issue
        .raw
        .as_ref()
        .and_then(|raw| raw.get("node_id"))
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(String::from)
    })
}

/// The payload for writing `request` into `field`, or `None` if a
/// single-select field has no option named like the value.
fn field_value(field: &ProjectField, request: &FieldUpdateRequest) -> Option<FieldValue> {
  let text = request.text();
  match &field.kind {
    FieldKind::SingleSelect { options } => options
      .get(&text)
      .map(|id| FieldValue::SingleSelectOptionId(id.clone())),
    FieldKind::Text => Some(FieldValue::Text(text)),
  }
}
