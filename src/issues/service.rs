use std::sync::Arc;
use tracing::{info, warn};

use super::request::{IssueDraft, IssueRequest};
use crate::error::Result;
use crate::github::{Issue, ProjectApi, RepoApi};
use crate::project::{LinkReport, ProjectLinker};

/// Result of [`IssueService::create`]. The issue exists even when linking
/// failed; nothing is rolled back.
#[derive(Debug)]
pub struct CreatedIssue {
  pub issue: Issue,
  pub link: Result<LinkReport>,
}

impl CreatedIssue {
  pub fn is_linked(&self) -> bool {
    self.link.is_ok()
  }
}

/// Previews and creates proofreading issues on the content repository and
/// links them to a project board.
pub struct IssueService {
  repo: Arc<dyn RepoApi>,
  linker: ProjectLinker,
  project_id: String,
}

impl IssueService {
  pub fn new(repo: Arc<dyn RepoApi>, project: Arc<dyn ProjectApi>, project_id: impl Into<String>) -> Self {
    Self {
      linker: ProjectLinker::new(repo.clone(), project),
      repo,
      project_id: project_id.into(),
    }
  }

  /// Validate and build the draft without touching the remote.
  pub fn preview(request: &IssueRequest) -> Result<IssueDraft> {
    request.validate()?;
    Ok(request.draft())
  }

  pub async fn create(&self, request: &IssueRequest) -> Result<CreatedIssue> {
    let draft = Self::preview(request)?;
    let issue = self.repo.create_issue(&draft.to_new_issue()).await?;
    info!(issue = issue.number, url = %issue.html_url, "created issue");

    let link = self
      .linker
      .link(&issue, &self.project_id, &draft.project_fields)
      .await;
    if let Err(e) = &link {
      warn!(issue = issue.number, error = %e, "issue created but not linked");
    }

    Ok(CreatedIssue { issue, link })
  }
}
