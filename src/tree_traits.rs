/*
Terminal rendering for built decision trees.

A conversion trait keeps the termtree dependency out of the domain layer.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeType, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One-line label: type marker, id, first label line and search term.
pub fn node_caption(node: &TreeNode) -> String {
    let marker = match node.node_type {
        NodeType::Treatment => "[T]",
        NodeType::Condition => "[C]",
        NodeType::Header => "[H]",
        NodeType::Generic => "[ ]",
        NodeType::Next => "[>]",
    };
    let first_line = node.label.lines().next().unwrap_or_default().trim();
    match &node.search_term {
        Some(term) => format!("{marker} {}: {first_line}  <{term}>", node.id),
        None => format!("{marker} {}: {first_line}", node.id),
    }
}

impl TreeNodeConvert for TreeNode {
    #[instrument(level = "trace", skip(self), fields(id = %self.id))]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(node_caption(self)).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, node_type: NodeType, search_term: Option<&str>) -> TreeNode {
        TreeNode {
            id: id.into(),
            label: format!("{id} label\nsecond line"),
            node_type,
            queryable: search_term.is_some(),
            search_term: search_term.map(String::from),
            footnote_labels: vec![],
            tree_ids: vec![],
            children: vec![],
        }
    }

    #[test]
    fn given_tree_when_rendering_then_children_nested_with_markers() {
        let mut root = leaf("root", NodeType::Header, None);
        root.children
            .push(leaf("a", NodeType::Treatment, Some("osimertinib")));

        let rendered = root.to_tree_string().to_string();

        assert!(rendered.starts_with("[H] root: root label"));
        assert!(rendered.contains("[T] a: a label  <osimertinib>"));
        assert!(!rendered.contains("second line"));
    }
}
