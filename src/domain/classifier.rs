//! Node classification and search-term extraction.

use itertools::Itertools;

use crate::domain::entities::Classification;
use crate::domain::vocabulary::Vocabulary;

/// Minimum length (in characters) of an extracted search term.
pub const MIN_SEARCH_TERM_LEN: usize = 3;

/// Labels each node with a semantic type and a queryable flag.
///
/// Precision over recall: only labels that plausibly name a treatment or an
/// actionable condition are ever sent to the trials registry.
#[derive(Debug, Clone, Default)]
pub struct NodeClassifier {
    vocabulary: Vocabulary,
}

impl NodeClassifier {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Classify a node label. First match wins: header, treatment, condition,
    /// then generic.
    pub fn classify(&self, content: &str) -> Classification {
        if self.is_header(content) {
            return Classification::HEADER;
        }

        let lower = content.to_lowercase();
        if contains_any(&lower, &self.vocabulary.treatment_terms) {
            return Classification::TREATMENT;
        }
        if contains_any(&lower, &self.vocabulary.condition_terms) {
            return Classification::CONDITION;
        }
        Classification::GENERIC
    }

    /// Structural scaffolding: an exact header label or a cross-reference prefix.
    pub fn is_header(&self, content: &str) -> bool {
        let trimmed = content.trim().to_lowercase();
        self.vocabulary.header_labels.iter().any(|l| *l == trimmed)
            || self
                .vocabulary
                .header_prefixes
                .iter()
                .any(|p| trimmed.starts_with(p.as_str()))
    }

    /// Canonical search phrase for a label: its first line with bullet and
    /// whitespace runs collapsed. Generic labels and very short phrases yield `None`.
    pub fn extract_search_term(&self, content: &str) -> Option<String> {
        let first_line = content.split('\n').next().unwrap_or_default();
        let cleaned = first_line
            .split(|c: char| c == '•' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .join(" ");

        if cleaned.chars().count() < MIN_SEARCH_TERM_LEN
            || self.vocabulary.generic_labels.iter().any(|g| *g == cleaned)
        {
            return None;
        }
        Some(cleaned)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeType;
    use rstest::rstest;

    #[rstest]
    #[case("Treatment Options", NodeType::Header)]
    #[case("  criteria ", NodeType::Header)]
    #[case("Findings", NodeType::Header)]
    #[case("See NSCL-8", NodeType::Header)]
    #[case("Refer to systemic therapy", NodeType::Header)]
    #[case("Treatment", NodeType::Header)]
    #[case("Osimertinib", NodeType::Treatment)]
    #[case("Concurrent chemoradiation", NodeType::Treatment)]
    #[case("EGFR exon 19 deletion positive", NodeType::Condition)]
    #[case("Stage IIIA", NodeType::Condition)]
    #[case("Patient preference", NodeType::Generic)]
    #[case("", NodeType::Generic)]
    fn classify_labels(#[case] label: &str, #[case] expected: NodeType) {
        let classifier = NodeClassifier::default();
        assert_eq!(classifier.classify(label).node_type, expected);
    }

    #[test]
    fn given_header_and_treatment_keyword_when_classifying_then_header_wins() {
        let classifier = NodeClassifier::default();
        let c = classifier.classify("Subsequent Therapy");
        assert_eq!(c, Classification::HEADER);
    }

    #[test]
    fn given_empty_label_when_classifying_then_generic_not_queryable() {
        let classifier = NodeClassifier::default();
        assert_eq!(classifier.classify(""), Classification::GENERIC);
        assert!(!classifier.classify("").queryable);
    }

    #[test]
    fn given_multiline_label_when_extracting_then_first_line_cleaned() {
        let classifier = NodeClassifier::default();
        let term = classifier.extract_search_term("•  Pembrolizumab\t+ chemo\n• second line");
        assert_eq!(term.as_deref(), Some("Pembrolizumab + chemo"));
    }

    #[rstest]
    #[case("Treatment")]
    #[case("Options")]
    #[case("Initial Presentation")]
    #[case("ab")]
    #[case("• \n")]
    fn extract_rejects_generic_and_short(#[case] label: &str) {
        let classifier = NodeClassifier::default();
        assert_eq!(classifier.extract_search_term(label), None);
    }
}
