//! Proofreading issues: drafting, creation and project linking.

mod request;
mod service;
pub mod urls;

pub use request::{CourseContent, IssueDraft, IssueKind, IssueRequest, TutorialContent};
pub use service::{CreatedIssue, IssueService};
