//! Integration tests for TrialTableService loading mixed-schema data sources

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use trialome::application::services::TrialTableService;
use trialome::domain::trial::{display, MISSING_FIELD};
use trialome::domain::TrialSchema;
use trialome::infrastructure::traits::RealFileSystem;

const MIXED_ROWS: &str = r#"[
    {
        "Trial_ID": "NCT04487080",
        "Title": "Amivantamab and Lazertinib in EGFR-mutated NSCLC",
        "Overall_Status": "RECRUITING",
        "Study_Phase": "PHASE3",
        "Enrollment": 1074,
        "All_Conditions": "Non-Small Cell Lung Cancer"
    },
    {
        "Trial_ID": "NCT02296125",
        "Title": "Osimertinib versus standard of care",
        "Has_Outcome_Data": "Yes",
        "Primary_Outcomes": "Progression-free survival"
    },
    {
        "NCT_ID": "NCT03521154",
        "Official Title": "Durvalumab after chemoradiation in stage III",
        "Experimental Drugs": "durvalumab",
        "Biomarkers": "PD-L1",
        "Efficacy Status": "Positive"
    },
    {
        "Title": "row without an identifier"
    }
]"#;

fn load_fixture(temp: &TempDir) -> trialome::domain::TrialTable {
    let path = temp.path().join("trials.json");
    fs::write(&path, MIXED_ROWS).unwrap();
    TrialTableService::new(Arc::new(RealFileSystem))
        .load(&path)
        .expect("load trials")
}

#[test]
fn given_mixed_schema_rows_when_loading_then_each_mapped_and_idless_skipped() {
    // Arrange
    let temp = TempDir::new().unwrap();

    // Act
    let table = load_fixture(&temp);

    // Assert
    assert_eq!(table.len(), 3);
    let schemas: Vec<TrialSchema> = table.records().iter().map(|r| r.schema).collect();
    assert_eq!(
        schemas,
        vec![
            TrialSchema::Summary,
            TrialSchema::Outcomes,
            TrialSchema::Extraction
        ]
    );
    let summary = table.get("nct04487080").unwrap();
    assert_eq!(summary.enrollment.as_deref(), Some("1074"));
}

#[test]
fn given_absent_fields_when_displaying_then_placeholder() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let table = load_fixture(&temp);

    // Act
    let outcomes = table.get("NCT02296125").unwrap();

    // Assert
    assert_eq!(display(&outcomes.status), MISSING_FIELD);
    assert_eq!(display(&outcomes.primary_outcomes), "Progression-free survival");
}

#[test]
fn given_multi_word_query_when_searching_then_all_words_required() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let table = load_fixture(&temp);

    // Act
    let hits = table.search("durvalumab PD-L1");
    let none = table.search("durvalumab egfr");
    let all = table.search("");

    // Assert
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].nct_id, "NCT03521154");
    assert!(none.is_empty());
    assert_eq!(all.len(), 3);
}

#[test]
fn given_invalid_json_when_loading_then_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{\"not\": \"an array\"}").unwrap();

    let result = TrialTableService::new(Arc::new(RealFileSystem)).load(&path);

    assert!(result.is_err());
}
