//! Traversal helpers over built decision trees.

use crate::domain::entities::TreeNode;

impl TreeNode {
    /// Pre-order, left-to-right iterator.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Labels of all leaf nodes, left to right.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|n| n.children.is_empty())
            .map(|n| n.label.clone())
            .collect()
    }

    /// Nodes carrying a search term, in pre-order.
    pub fn queryable_nodes(&self) -> Vec<&TreeNode> {
        self.iter().filter(|n| n.search_term.is_some()).collect()
    }

    /// Every instance of a source node; diamonds produce several.
    pub fn find_all(&self, id: &str) -> Vec<&TreeNode> {
        self.iter().filter(|n| n.id == id).collect()
    }

    /// Distinct header labels per depth, for laying out column headings.
    ///
    /// Index `d` holds the headers found at depth `d` (root is depth 0), in
    /// first-seen order. Depths without headers are empty.
    pub fn column_headers(&self, header_labels: &[String]) -> Vec<Vec<String>> {
        let mut headers: Vec<Vec<String>> = Vec::new();
        self.collect_headers(header_labels, 0, &mut headers);
        headers
    }

    fn collect_headers(&self, header_labels: &[String], depth: usize, headers: &mut Vec<Vec<String>>) {
        if header_labels.iter().any(|h| h.eq_ignore_ascii_case(self.label.trim())) {
            if headers.len() <= depth {
                headers.resize_with(depth + 1, Vec::new);
            }
            if !headers[depth].contains(&self.label) {
                headers[depth].push(self.label.clone());
            }
        }
        for child in &self.children {
            child.collect_headers(header_labels, depth + 1, headers);
        }
    }
}

pub struct TreeIterator<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> TreeIterator<'a> {
    fn new(root: &'a TreeNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

pub struct PostOrderIterator<'a> {
    stack: Vec<(&'a TreeNode, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(root: &'a TreeNode) -> Self {
        Self {
            stack: vec![(root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for child in current.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
