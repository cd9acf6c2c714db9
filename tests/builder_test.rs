//! Tests for TreeBuilder: flat graph documents to classified trees

use rstest::rstest;

use trialome::domain::{
    DomainError, FlatGraphNode, GraphDocument, MalformedReason, NodeType, TreeBuilder,
};
use trialome::util::testing;

fn node(id: &str, content: &str, parents: &[&str], children: &[&str]) -> FlatGraphNode {
    FlatGraphNode {
        id: id.into(),
        content: content.into(),
        parent_ids: parents.iter().map(|s| s.to_string()).collect(),
        children_ids: children.iter().map(|s| s.to_string()).collect(),
        footnote_labels: vec![],
        tree_ids: vec![],
    }
}

fn document(nodes: Vec<FlatGraphNode>) -> GraphDocument {
    GraphDocument {
        nodes,
        ..Default::default()
    }
}

#[test]
fn given_cycle_below_root_when_building_then_cyclic_branch_truncated() {
    testing::init_test_setup();
    // Arrange: R -> A -> B -> A
    let doc = document(vec![
        node("R", "Workup", &[], &["A"]),
        node("A", "Node A", &["R", "B"], &["B"]),
        node("B", "Node B", &["A"], &["A"]),
    ]);

    // Act
    let root = TreeBuilder::default().build("T", &doc).unwrap();

    // Assert
    let ids: Vec<&str> = root.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["R", "A", "B"]);
    let b = root.find_all("B")[0];
    assert!(b.children.is_empty(), "back-reference to A must be dropped");
}

#[test]
fn given_self_loop_when_building_then_terminates() {
    // Arrange
    let doc = document(vec![
        node("R", "Workup", &[], &["S"]),
        node("S", "Node S", &["R", "S"], &["S"]),
    ]);

    // Act
    let root = TreeBuilder::default().build("T", &doc).unwrap();

    // Assert
    assert_eq!(root.node_count(), 2);
}

#[test]
fn given_diamond_when_building_then_shared_child_duplicated() {
    // Arrange: R -> {L, Rt} -> D
    let doc = document(vec![
        node("R", "Workup", &[], &["L", "Rt"]),
        node("L", "Node L", &["R"], &["D"]),
        node("Rt", "Node Rt", &["R"], &["D"]),
        node("D", "Osimertinib", &["L", "Rt"], &[]),
    ]);

    // Act
    let root = TreeBuilder::default().build("T", &doc).unwrap();

    // Assert
    let copies = root.find_all("D");
    assert_eq!(copies.len(), 2);
    assert_eq!(copies[0], copies[1], "copies carry identical content");
    assert!(
        !std::ptr::eq(copies[0], copies[1]),
        "copies are independent instances"
    );
    assert_eq!(root.node_count(), 5);
}

#[test]
fn given_children_ids_order_when_building_then_order_preserved() {
    // Arrange
    let doc = document(vec![
        node("R", "Workup", &[], &["c3", "c1", "c2"]),
        node("c1", "one", &["R"], &[]),
        node("c2", "two", &["R"], &[]),
        node("c3", "three", &["R"], &[]),
    ]);

    // Act
    let root = TreeBuilder::default().build("T", &doc).unwrap();

    // Assert
    let order: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["c3", "c1", "c2"]);
}

#[test]
fn given_mixed_labels_when_building_then_classification_attached() {
    // Arrange
    let doc = document(vec![
        node("R", "Treatment Options", &[], &["c", "t", "g"]),
        node("c", "EGFR exon 19 deletion positive", &["R"], &[]),
        node("t", "Osimertinib\n• preferred", &["R"], &[]),
        node("g", "Observe", &["R"], &[]),
    ]);

    // Act
    let root = TreeBuilder::default().build("T", &doc).unwrap();

    // Assert
    assert_eq!(root.node_type, NodeType::Header);
    assert!(!root.queryable);
    assert!(root.search_term.is_none());

    let c = &root.children[0];
    assert_eq!(c.node_type, NodeType::Condition);
    assert_eq!(c.search_term.as_deref(), Some("EGFR exon 19 deletion positive"));

    let t = &root.children[1];
    assert_eq!(t.node_type, NodeType::Treatment);
    assert_eq!(t.search_term.as_deref(), Some("Osimertinib"));

    let g = &root.children[2];
    assert_eq!(g.node_type, NodeType::Generic);
    assert!(g.search_term.is_none());
}

#[rstest]
#[case::no_nodes(vec![], MalformedReason::Empty)]
#[case::pure_cycle(
    vec![node("A", "a", &["B"], &["B"]), node("B", "b", &["A"], &["A"])],
    MalformedReason::NoRoot
)]
#[case::two_roots(
    vec![node("A", "a", &[], &[]), node("B", "b", &[], &[])],
    MalformedReason::MultipleRoots(vec!["A".into(), "B".into()])
)]
fn given_malformed_graph_when_building_then_typed_error(
    #[case] nodes: Vec<FlatGraphNode>,
    #[case] expected: MalformedReason,
) {
    // Act
    let err = TreeBuilder::default()
        .build("BAD_1", &document(nodes))
        .unwrap_err();

    // Assert
    match err {
        DomainError::MalformedGraph { tree_id, reason } => {
            assert_eq!(tree_id, "BAD_1");
            assert_eq!(reason, expected);
        }
        other => panic!("unexpected error: {other}"),
    }
}
