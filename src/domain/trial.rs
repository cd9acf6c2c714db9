//! Trial records from the pre-built trials data source.
//!
//! Three ingestion generations produced differently named columns. Each raw
//! row is mapped onto one canonical [`TrialRecord`]:
//!
//! | field              | Summary             | Outcomes            | Extraction            |
//! |--------------------|---------------------|---------------------|-----------------------|
//! | `nct_id`           | `Trial_ID`          | `Trial_ID`          | `NCT_ID`              |
//! | `title`            | `Title`             | `Title`             | `Official Title`      |
//! | `official_title`   | `Official_Title`    | -                   | `Official Title`      |
//! | `status`           | `Overall_Status`    | -                   | -                     |
//! | `phase`            | `Study_Phase`       | -                   | -                     |
//! | `enrollment`       | `Enrollment`        | -                   | -                     |
//! | `conditions`       | `All_Conditions`    | -                   | -                     |
//! | `experimental_drugs` | -                 | -                   | `Experimental Drugs`  |
//! | `biomarkers`       | -                   | -                   | `Biomarkers`          |
//! | `primary_outcomes` | `Primary_Outcomes`  | `Primary_Outcomes`  | `Primary Outcomes`    |
//! | `efficacy_status`  | -                   | -                   | `Efficacy Status`     |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder rendered for absent fields.
pub const MISSING_FIELD: &str = "N/A";

/// One row of the data source: column name to string or number.
pub type RawTrialRecord = BTreeMap<String, Value>;

/// Ingestion generation a raw row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialSchema {
    /// Registry summary export (status, phase, enrollment)
    Summary,
    /// Outcome analysis export
    Outcomes,
    /// Model-assisted extraction (drugs, biomarkers, efficacy)
    Extraction,
}

impl TrialSchema {
    pub fn detect(raw: &RawTrialRecord) -> Self {
        if raw.contains_key("NCT_ID") {
            TrialSchema::Extraction
        } else if raw.contains_key("Overall_Status") || raw.contains_key("Study_Phase") {
            TrialSchema::Summary
        } else {
            TrialSchema::Outcomes
        }
    }
}

impl fmt::Display for TrialSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrialSchema::Summary => "summary",
            TrialSchema::Outcomes => "outcomes",
            TrialSchema::Extraction => "extraction",
        };
        f.write_str(s)
    }
}

/// Canonical trial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub nct_id: String,
    pub title: Option<String>,
    pub official_title: Option<String>,
    pub status: Option<String>,
    pub phase: Option<String>,
    pub enrollment: Option<String>,
    pub conditions: Option<String>,
    pub experimental_drugs: Option<String>,
    pub biomarkers: Option<String>,
    pub primary_outcomes: Option<String>,
    pub efficacy_status: Option<String>,
    pub schema: TrialSchema,
}

impl TrialRecord {
    /// Map a raw row. Rows without an identifier yield `None`.
    pub fn from_raw(raw: &RawTrialRecord) -> Option<Self> {
        let schema = TrialSchema::detect(raw);
        let nct_id = column(raw, &["NCT_ID", "Trial_ID", "nct_id", "nctId"])?;
        let official_title = column(raw, &["Official_Title", "Official Title", "officialTitle"]);

        Some(Self {
            nct_id,
            title: column(raw, &["Title", "Brief_Title", "briefTitle"]).or_else(|| official_title.clone()),
            official_title,
            status: column(raw, &["Overall_Status", "Status"]),
            phase: column(raw, &["Study_Phase", "Phase"]),
            enrollment: column(raw, &["Enrollment"]),
            conditions: column(raw, &["All_Conditions", "Primary_Condition", "Conditions"]),
            experimental_drugs: column(raw, &["Experimental Drugs", "Experimental_Drugs"]),
            biomarkers: column(raw, &["Biomarkers"]),
            primary_outcomes: column(raw, &["Primary_Outcomes", "Primary Outcomes"]),
            efficacy_status: column(raw, &["Efficacy Status", "Efficacy_Status"]),
            schema,
        })
    }

    /// Lowercased text searched by the trials table.
    pub fn search_text(&self) -> String {
        [
            Some(&self.nct_id),
            self.title.as_ref(),
            self.official_title.as_ref(),
            self.conditions.as_ref(),
            self.experimental_drugs.as_ref(),
            self.biomarkers.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn display_title(&self) -> &str {
        display(&self.title)
    }
}

/// Render an optional field, substituting [`MISSING_FIELD`].
pub fn display(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(MISSING_FIELD)
}

/// First non-empty value among the candidate columns, numbers stringified.
fn column(raw: &RawTrialRecord, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match raw.get(*name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Searchable, read-only table of trial records.
#[derive(Debug, Clone, Default)]
pub struct TrialTable {
    records: Vec<TrialRecord>,
}

impl TrialTable {
    pub fn new(records: Vec<TrialRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn get(&self, nct_id: &str) -> Option<&TrialRecord> {
        self.records
            .iter()
            .find(|r| r.nct_id.eq_ignore_ascii_case(nct_id))
    }

    /// Records whose searchable text contains every query word
    /// (case-insensitive). An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&TrialRecord> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.records
            .iter()
            .filter(|record| {
                let text = record.search_text();
                words.iter().all(|w| text.contains(w.as_str()))
            })
            .collect()
    }
}
