//! Project layout: configuration, search paths and file lookup.
//!
//! - [`ProjectConfig`] - Search paths, suffixes, current file
//! - [`find_artifact`] - Unit name to compiled artifact
//! - [`SourceResolver`] - Unit name to source file, with disambiguation

mod config;
mod loader;
pub mod search;
pub mod source;

pub use config::{ProjectConfig, SuffixPair};
pub use loader::ConfigError;
pub use search::{find_artifact, module_of_file, name_variants};
pub use source::{SourceError, SourceRequest, SourceResolver, suffix_score};
