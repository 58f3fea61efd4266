//! issuesmith: branch and language lookups for the content repository, and
//! proofreading issues linked to a GitHub project board.

pub mod branches;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod issues;
pub mod languages;
pub mod project;
#[cfg(test)]
mod test_support;
pub mod validators;
