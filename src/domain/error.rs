//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// Why a graph document could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The document has no nodes at all
    Empty,
    /// Every node has at least one parent
    NoRoot,
    /// More than one node has an empty parent list
    MultipleRoots(Vec<String>),
    /// Two nodes share the same id
    DuplicateNode(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::Empty => write!(f, "document has no nodes"),
            MalformedReason::NoRoot => write!(f, "no node without parents"),
            MalformedReason::MultipleRoots(ids) => {
                write!(f, "multiple root candidates: {}", ids.join(", "))
            }
            MalformedReason::DuplicateNode(id) => write!(f, "duplicate node id: {id}"),
        }
    }
}

/// Domain errors represent violations of the graph document contract.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("malformed graph {tree_id}: {reason}")]
    MalformedGraph {
        tree_id: String,
        reason: MalformedReason,
    },

    #[error("invalid graph document {source_name}: {message}")]
    InvalidDocument {
        source_name: String,
        message: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
