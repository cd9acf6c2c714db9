//! Tree builder converting flat decision graphs into rooted trees.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::classifier::NodeClassifier;
use crate::domain::entities::{FlatGraphNode, GraphDocument, TreeNode};
use crate::domain::error::{DomainError, MalformedReason};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs classified decision trees from flat graph documents.
///
/// The walk is depth-first from the unique root. The visited set is scoped to
/// the current root-to-node path: a node reachable through two parents is
/// emitted under both, while a back-reference to an ancestor ends that branch.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    classifier: NodeClassifier,
}

impl TreeBuilder {
    pub fn new(classifier: NodeClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &NodeClassifier {
        &self.classifier
    }

    /// Build the tree for one document.
    ///
    /// `tree_id` is only used for error reporting.
    #[instrument(level = "debug", skip(self, document), fields(nodes = document.nodes.len()))]
    pub fn build(&self, tree_id: &str, document: &GraphDocument) -> TreeResult<TreeNode> {
        let malformed = |reason| DomainError::MalformedGraph {
            tree_id: tree_id.to_string(),
            reason,
        };

        if document.nodes.is_empty() {
            return Err(malformed(MalformedReason::Empty));
        }

        let mut index: HashMap<&str, &FlatGraphNode> = HashMap::with_capacity(document.nodes.len());
        for node in &document.nodes {
            if index.insert(node.id.as_str(), node).is_some() {
                return Err(malformed(MalformedReason::DuplicateNode(node.id.clone())));
            }
        }

        let roots: Vec<&FlatGraphNode> = document
            .nodes
            .iter()
            .filter(|n| n.is_root_candidate())
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(malformed(MalformedReason::NoRoot)),
            [root] => *root,
            many => {
                let ids = many.iter().map(|n| n.id.clone()).collect();
                return Err(malformed(MalformedReason::MultipleRoots(ids)));
            }
        };

        let mut path = HashSet::new();
        self.build_subtree(&root.id, &index, &mut path)
            .ok_or_else(|| malformed(MalformedReason::NoRoot))
    }

    fn build_subtree<'d>(
        &self,
        node_id: &'d str,
        index: &HashMap<&'d str, &'d FlatGraphNode>,
        path: &mut HashSet<&'d str>,
    ) -> Option<TreeNode> {
        if path.contains(node_id) {
            debug!("cycle back to {}, branch truncated", node_id);
            return None;
        }
        let Some(node) = index.get(node_id).copied() else {
            debug!("dangling child reference {}", node_id);
            return None;
        };

        path.insert(node_id);

        let classification = self.classifier.classify(&node.content);
        let search_term = if classification.queryable {
            self.classifier.extract_search_term(&node.content)
        } else {
            None
        };

        let children = node
            .children_ids
            .iter()
            .filter_map(|child_id| self.build_subtree(child_id, index, path))
            .collect();

        path.remove(node_id);

        Some(TreeNode {
            id: node.id.clone(),
            label: node.content.clone(),
            node_type: classification.node_type,
            queryable: classification.queryable,
            search_term,
            footnote_labels: node.footnote_labels.clone(),
            tree_ids: node.tree_ids.clone(),
            children,
        })
    }
}
