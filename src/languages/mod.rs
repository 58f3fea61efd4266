//! Language lookup and ranking.

mod catalog;
mod index;

pub use catalog::{
  builtin_index, HttpLanguageSource, LanguageCatalog, LanguageSource, RemoteLanguageCatalog,
  BUILTIN_LANGUAGES,
};
pub use index::{LanguageEntry, LanguageIndex};
