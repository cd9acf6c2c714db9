//! Integration tests for RegistryLoader: discovery, tree ids, skipped documents

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use trialome::application::services::RegistryLoader;
use trialome::config::DiseaseConfig;
use trialome::domain::TreeBuilder;
use trialome::infrastructure::traits::RealFileSystem;
use trialome::util::testing;

const SIMPLE_DOC: &str = r#"{
    "nodes": [
        {"id": "n1", "content": "Workup", "parent_ids": [], "children_ids": ["n2"]},
        {"id": "n2", "content": "Osimertinib", "parent_ids": ["n1"], "children_ids": [],
         "footnote_labels": ["a"]}
    ],
    "footnotes": [{"label": "a", "content": "Category 1 preferred"}]
}"#;

fn loader() -> RegistryLoader {
    RegistryLoader::new(
        Arc::new(RealFileSystem),
        TreeBuilder::default(),
        DiseaseConfig::default(),
    )
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

#[test]
fn given_page_named_documents_when_loading_then_ids_derived_and_sorted() {
    testing::init_test_setup();
    // Arrange
    let temp = TempDir::new().unwrap();
    write(temp.path(), "nscl_page-0031.dag.json", SIMPLE_DOC);
    write(temp.path(), "nscl_page-0023.dag.json", SIMPLE_DOC);
    write(temp.path(), "notes.txt", "ignored");

    // Act
    let (registry, report) = loader().load(temp.path()).unwrap();

    // Assert
    let ids: Vec<&str> = registry.ids().collect();
    assert_eq!(ids, vec!["NSCLC_0023", "NSCLC_0031"]);
    assert_eq!(report.loaded, vec!["NSCLC_0023", "NSCLC_0031"]);
    assert!(report.skipped.is_empty());

    let tree = registry.get("NSCLC_0023").unwrap();
    assert_eq!(tree.disease, "NSCLC");
    assert_eq!(tree.footnotes.len(), 1);
}

#[test]
fn given_declared_tree_id_when_loading_then_declared_id_wins() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let doc = SIMPLE_DOC.replacen('{', r#"{"tree_id": "CUSTOM_7","#, 1);
    write(temp.path(), "nscl_page-0001.dag.json", &doc);

    // Act
    let (registry, _) = loader().load(temp.path()).unwrap();

    // Assert
    assert!(registry.get("CUSTOM_7").is_some());
    assert!(registry.get("NSCLC_0001").is_none());
}

#[test]
fn given_bad_documents_when_loading_then_skipped_and_rest_loaded() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a_page-0001.dag.json", SIMPLE_DOC);
    write(temp.path(), "b_page-0002.dag.json", "{ not json");
    write(
        temp.path(),
        "c_page-0003.dag.json",
        r#"{"nodes": [{"id": "x", "parent_ids": []}, {"id": "y", "parent_ids": []}]}"#,
    );

    // Act
    let (registry, report) = loader().load(temp.path()).unwrap();

    // Assert
    assert_eq!(registry.len(), 1);
    assert_eq!(report.loaded, vec!["NSCLC_0001"]);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.source.ends_with("b_page-0002.dag.json")));
    assert!(report.skipped.iter().any(|s| s.source == "NSCLC_0003"));
}

#[test]
fn given_manifest_when_loading_then_only_listed_files_used() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write(temp.path(), "manifest.json", r#"{"files": ["keep.json"]}"#);
    write(temp.path(), "keep.json", SIMPLE_DOC);
    write(temp.path(), "x_page-0009.dag.json", SIMPLE_DOC);

    // Act
    let (registry, _) = loader().load(temp.path()).unwrap();

    // Assert
    let ids: Vec<&str> = registry.ids().collect();
    assert_eq!(ids, vec!["keep"]);
}

#[test]
fn given_missing_data_dir_when_loading_then_error() {
    let temp = TempDir::new().unwrap();
    let result = loader().load(&temp.path().join("nope"));
    assert!(result.is_err());
}

#[test]
fn given_loaded_tree_when_resolving_node_footnotes_then_content_returned() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write(temp.path(), "nscl_page-0002.dag.json", SIMPLE_DOC);
    let (registry, _) = loader().load(temp.path()).unwrap();
    let tree = registry.get("NSCLC_0002").unwrap();
    let node = tree.root.find_all("n2")[0];

    // Act
    let notes = registry.footnotes_for("NSCLC_0002", node);

    // Assert
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "Category 1 preferred");
}
