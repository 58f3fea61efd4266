use tracing::debug;

use crate::error::Result;
use crate::github::{ProjectApi, ProjectSummary};

/// Title fragment of the board proofreading issues belong on.
pub const PROOFREADING_HINT: &str = "proofreading";

/// An organization's boards, open ones first. Order within each group is
/// the API's.
pub async fn list_boards(api: &dyn ProjectApi, org: &str) -> Result<Vec<ProjectSummary>> {
  let mut boards = api.list_projects(org).await?;
  boards.sort_by_key(|b| b.closed);
  debug!(org, count = boards.len(), "listed project boards");
  Ok(boards)
}

/// First open board whose title mentions proofreading.
pub fn proofreading_board(boards: &[ProjectSummary]) -> Option<&ProjectSummary> {
  boards
    .iter()
    .filter(|b| !b.closed)
    .find(|b| b.title.to_lowercase().contains(PROOFREADING_HINT))
}
