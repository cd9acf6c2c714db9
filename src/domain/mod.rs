//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod classifier;
pub mod entities;
pub mod error;
pub mod sanitizer;
pub mod tree;
pub mod trial;
pub mod vocabulary;

pub use builder::TreeBuilder;
pub use classifier::NodeClassifier;
pub use entities::*;
pub use error::{DomainError, DomainResult, MalformedReason};
pub use sanitizer::SearchTermSanitizer;
pub use trial::{TrialRecord, TrialSchema, TrialTable};
pub use vocabulary::Vocabulary;

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
///
/// Uses shellexpand; unresolvable variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
