//! Keyword vocabularies driving node classification and query sanitization.
//!
//! The literal lists below are the compiled defaults. They can be replaced or
//! extended through the `[vocabulary]` section of the settings file.

/// Structural labels that classify a node as a column header (exact match,
/// case-insensitive, after trimming).
pub const HEADER_LABELS: &[&str] = &[
    "evaluation",
    "option",
    "options",
    "treatment",
    "criteria",
    "management",
    "finding",
    "findings",
    "initial presentation",
    "initial evaluation",
    "disease location",
    "subsequent therapy",
    "recurrence therapy",
    "treatment options",
    "workup",
    "staging",
    "assessment",
];

/// Prefixes that mark cross-reference nodes ("See NSCL-8") as headers.
pub const HEADER_PREFIXES: &[&str] = &["see", "refer to"];

/// Substrings that identify treatment nodes.
pub const TREATMENT_TERMS: &[&str] = &[
    "therapy",
    "chemotherapy",
    "radiation",
    "surgery",
    "resection",
    "ablation",
    "immunotherapy",
    "targeted",
    "pembrolizumab",
    "carboplatin",
    "cisplatin",
    "docetaxel",
    "nivolumab",
    "atezolizumab",
    "osimertinib",
    "erlotinib",
    "pemetrexed",
    "bevacizumab",
    "durvalumab",
    "cemiplimab",
    "paclitaxel",
    "gemcitabine",
    "vinorelbine",
    "etoposide",
];

/// Substrings that identify clinically actionable conditions and biomarkers.
pub const CONDITION_TERMS: &[&str] = &[
    "stage", "egfr", "alk", "ros1", "kras", "braf", "met", "pd-l1", "mutation", "positive",
    "negative", "her2", "ret", "ntrk", "exon",
];

/// Drug, biomarker and stage keywords kept first when a query is truncated.
pub const PRIORITY_TERMS: &[&str] = &[
    // drugs
    "pembrolizumab",
    "carboplatin",
    "cisplatin",
    "docetaxel",
    "nivolumab",
    "atezolizumab",
    "osimertinib",
    "erlotinib",
    "gefitinib",
    "afatinib",
    "dacomitinib",
    "crizotinib",
    "ceritinib",
    "alectinib",
    "brigatinib",
    "lorlatinib",
    "ensartinib",
    "entrectinib",
    "larotrectinib",
    "pemetrexed",
    "bevacizumab",
    "ramucirumab",
    "durvalumab",
    "cemiplimab",
    "ipilimumab",
    "avelumab",
    "paclitaxel",
    "gemcitabine",
    "vinorelbine",
    "etoposide",
    "ifosfamide",
    "cytarabine",
    "daunorubicin",
    "idarubicin",
    "gemtuzumab",
    // biomarkers
    "egfr",
    "alk",
    "ros1",
    "kras",
    "braf",
    "met",
    "pd-l1",
    "her2",
    "erbb2",
    "ret",
    "ntrk",
    "tmb",
    "msi",
    "exon",
    // staging
    "stage",
];

/// First-line labels never used as search terms.
pub const GENERIC_LABELS: &[&str] = &["Treatment", "Evaluation", "Options", "Initial Presentation"];

/// Connector words removed from search queries.
pub const CONNECTOR_WORDS: &[&str] = &["or", "and", "if", "after", "before", "with", "without"];

/// Normalized keyword lists used by the classifier and the sanitizer.
///
/// All lists except `generic_labels` are lowercased and free of empty entries,
/// so an empty term can never match every label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub header_labels: Vec<String>,
    pub header_prefixes: Vec<String>,
    pub treatment_terms: Vec<String>,
    pub condition_terms: Vec<String>,
    pub priority_terms: Vec<String>,
    /// Compared verbatim against the extracted first line
    pub generic_labels: Vec<String>,
    pub connector_words: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(
            &to_owned(HEADER_LABELS),
            &to_owned(HEADER_PREFIXES),
            &to_owned(TREATMENT_TERMS),
            &to_owned(CONDITION_TERMS),
            &to_owned(PRIORITY_TERMS),
            &to_owned(GENERIC_LABELS),
            &to_owned(CONNECTOR_WORDS),
        )
    }
}

impl Vocabulary {
    pub fn new(
        header_labels: &[String],
        header_prefixes: &[String],
        treatment_terms: &[String],
        condition_terms: &[String],
        priority_terms: &[String],
        generic_labels: &[String],
        connector_words: &[String],
    ) -> Self {
        Self {
            header_labels: normalize(header_labels),
            header_prefixes: normalize(header_prefixes),
            treatment_terms: normalize(treatment_terms),
            condition_terms: normalize(condition_terms),
            priority_terms: normalize(priority_terms),
            generic_labels: generic_labels
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            connector_words: normalize(connector_words),
        }
    }
}

/// Convert a literal list into owned strings.
pub fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|s| s.to_string()).collect()
}

fn normalize(terms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}
