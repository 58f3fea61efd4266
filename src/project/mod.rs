//! Linking issues to a project board, and finding the board to link to.

mod boards;
pub mod fields;
mod linker;

pub use boards::{list_boards, proofreading_board, PROOFREADING_HINT};
pub use fields::{default_fields, FieldSchema};
pub use linker::{FieldSkip, LinkReport, ProjectLinker, SkipReason};
