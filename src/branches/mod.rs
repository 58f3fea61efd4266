//! Branch resolution and ranking.
//!
//! Branch names come from a local git checkout when one is configured and
//! readable (cached for a minute), otherwise from the remote API (cached for
//! five minutes). A failing remote degrades to the last good list and then to
//! a static fallback; reads never fail.

mod resolver;
mod search;
mod similarity;
mod snapshot;

pub use resolver::{BranchOrigin, BranchResolver, SearchContext, DEFAULT_SEARCH_LIMIT, FALLBACK_BRANCHES};
pub use search::{language_branches, language_patterns, rank_branches, PREFERRED_BRANCHES};
pub use similarity::token_sort_ratio;
pub use snapshot::{parse_branch_listing, BranchSnapshot, GitSnapshot};
