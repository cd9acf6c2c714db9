//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// A decision node as it appears in a flat graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatGraphNode {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub footnote_labels: Vec<String>,
    /// Cross-references to other trees (e.g. "NSCL-16")
    #[serde(default)]
    pub tree_ids: Vec<String>,
}

impl FlatGraphNode {
    /// A node with no parents is a root candidate.
    pub fn is_root_candidate(&self) -> bool {
        self.parent_ids.is_empty()
    }
}

/// Footnote attached to a graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    pub label: String,
    #[serde(default)]
    pub content: String,
}

/// One flat DAG document: the unit of loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Tree identifier; when absent the loader derives one from the filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<FlatGraphNode>,
    #[serde(default)]
    pub footnotes: Vec<Footnote>,
    /// Curated keywords added by the ingestion tooling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_title: Option<String>,
}

impl GraphDocument {
    /// Parse a graph document from JSON text.
    ///
    /// `source_name` is only used for error reporting.
    pub fn from_json(json: &str, source_name: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidDocument {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// The non-empty `tree_id` carried by the document, if any.
    pub fn declared_tree_id(&self) -> Option<&str> {
        self.tree_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Semantic type of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Treatment,
    Condition,
    Header,
    Generic,
    /// Continuation marker pointing into another tree. Never produced by the
    /// classifier; only present in pre-classified tree data.
    Next,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Treatment => "treatment",
            NodeType::Condition => "condition",
            NodeType::Header => "header",
            NodeType::Generic => "generic",
            NodeType::Next => "next",
        };
        f.write_str(s)
    }
}

/// Output of the node classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub node_type: NodeType,
    pub queryable: bool,
}

impl Classification {
    pub const HEADER: Self = Self {
        node_type: NodeType::Header,
        queryable: false,
    };
    pub const TREATMENT: Self = Self {
        node_type: NodeType::Treatment,
        queryable: true,
    };
    pub const CONDITION: Self = Self {
        node_type: NodeType::Condition,
        queryable: true,
    };
    pub const GENERIC: Self = Self {
        node_type: NodeType::Generic,
        queryable: false,
    };
}

/// A node of a built decision tree.
///
/// Every instance is owned by its parent: a source node reachable through
/// several parents appears once per path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub queryable: bool,
    pub search_term: Option<String>,
    pub footnote_labels: Vec<String>,
    pub tree_ids: Vec<String>,
    pub children: Vec<TreeNode>,
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
