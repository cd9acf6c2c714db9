//! Search-term sanitization for the trials registry.
//!
//! The registry's free-text parser rejects long boolean-looking phrases, so a
//! label is reduced to at most [`MAX_QUERY_WORDS`] lowercase words with drug,
//! biomarker and stage keywords placed first.

use itertools::Itertools;
use regex::Regex;

use crate::domain::vocabulary::Vocabulary;

/// Upper bound on words in a sanitized query.
pub const MAX_QUERY_WORDS: usize = 4;

/// Words shorter than this (in characters) are dropped.
pub const MIN_WORD_LEN: usize = 3;

/// Characters deleted from queries.
const STRIPPED_CHARS: &[char] = &[',', ';', ':', '+'];

/// Priority keywords up to this length must equal one alphanumeric piece of a word.
const EXACT_MATCH_MAX_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct SearchTermSanitizer {
    priority_terms: Vec<String>,
    connector_words: Vec<String>,
    parenthetical: Regex,
}

impl Default for SearchTermSanitizer {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

impl SearchTermSanitizer {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            priority_terms: vocabulary.priority_terms.clone(),
            connector_words: vocabulary.connector_words.clone(),
            parenthetical: Regex::new(r"\([^()]*\)").unwrap(),
        }
    }

    /// Reduce a raw label to an API-safe query.
    ///
    /// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
    pub fn sanitize(&self, term: &str) -> String {
        let lowered = term.to_lowercase();
        let without_asides = self.strip_parentheticals(&lowered);
        let cleaned: String = without_asides
            .chars()
            .filter(|c| !STRIPPED_CHARS.contains(c))
            .collect();

        let words: Vec<&str> = cleaned
            .split_whitespace()
            .filter(|w| !self.is_connector(w))
            .filter(|w| w.chars().count() >= MIN_WORD_LEN)
            .collect();

        let (priority, other): (Vec<&str>, Vec<&str>) =
            words.into_iter().partition(|w| self.is_priority(w));

        priority
            .into_iter()
            .chain(other)
            .take(MAX_QUERY_WORDS)
            .join(" ")
    }

    /// Append the disease context unless the term already names it.
    pub fn enrich(&self, sanitized: &str, disease: Option<&str>) -> String {
        let disease = disease.map(str::trim).unwrap_or_default();
        if sanitized.is_empty() || disease.is_empty() {
            return sanitized.to_string();
        }
        let disease_lower = disease.to_lowercase();
        if sanitized.split_whitespace().any(|w| w == disease_lower) {
            return sanitized.to_string();
        }
        format!("{sanitized} {disease}")
    }

    /// Sanitized and enriched query, or `None` when nothing searchable remains.
    pub fn query_term(&self, raw: &str, disease: Option<&str>) -> Option<String> {
        let sanitized = self.sanitize(raw);
        if sanitized.is_empty() {
            return None;
        }
        Some(self.enrich(&sanitized, disease))
    }

    /// Substring match against the priority list; short keywords such as
    /// `alk` or `met` must equal an alphanumeric piece of the word instead, so
    /// "alk-positive" matches and "metastatic" does not.
    pub fn is_priority(&self, word: &str) -> bool {
        self.priority_terms.iter().any(|t| {
            if t.chars().count() <= EXACT_MATCH_MAX_LEN {
                word.split(|c: char| !c.is_alphanumeric())
                    .any(|piece| piece == t)
            } else {
                word.contains(t.as_str())
            }
        })
    }

    fn is_connector(&self, word: &str) -> bool {
        self.connector_words.iter().any(|c| c == word)
    }

    /// Remove balanced `(...)` groups innermost-first, then any stray parenthesis.
    fn strip_parentheticals(&self, text: &str) -> String {
        let mut current = text.to_string();
        while self.parenthetical.is_match(&current) {
            current = self.parenthetical.replace_all(&current, " ").into_owned();
        }
        current.replace(['(', ')'], " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_drug_regimen_label_when_sanitizing_then_parenthetical_and_connectors_removed() {
        let sanitizer = SearchTermSanitizer::default();
        let label = "Cytarabine + (daunorubicin or idarubicin) + gemtuzumab ozogamicin \
                     (only if gemtuzumab ozogamicin was given during induction)";

        let result = sanitizer.sanitize(label);

        assert_eq!(result, "cytarabine gemtuzumab ozogamicin");
        assert!(result.split(' ').count() <= MAX_QUERY_WORDS);
    }

    #[test]
    fn given_more_than_four_words_when_sanitizing_then_priority_words_first() {
        let sanitizer = SearchTermSanitizer::default();
        let result = sanitizer.sanitize("Consider adjuvant systemic regimen containing osimertinib for EGFR");
        assert_eq!(result, "osimertinib egfr consider adjuvant");
    }

    #[test]
    fn given_nested_parentheses_when_sanitizing_then_whole_group_removed() {
        let sanitizer = SearchTermSanitizer::default();
        let result = sanitizer.sanitize("Alectinib (preferred (category 1)) therapy");
        assert_eq!(result, "alectinib therapy");
    }

    #[test]
    fn given_short_keyword_when_matching_priority_then_compared_per_piece() {
        let sanitizer = SearchTermSanitizer::default();
        assert!(sanitizer.is_priority("met"));
        assert!(sanitizer.is_priority("alk-positive"));
        assert!(sanitizer.is_priority("met-amplified"));
        assert!(sanitizer.is_priority("egfr/ret-rearranged"));
        assert!(!sanitizer.is_priority("metastatic"));
        assert!(!sanitizer.is_priority("retreatment"));
        assert!(sanitizer.is_priority("egfr-mutant"));
    }

    #[rstest]
    #[case("Disease progression following initial systemic ALK-positive", "alk-positive")]
    #[case("Subsequent therapy for metastatic disease MET-amplified", "met-amplified")]
    #[case("Consider clinical trial enrollment when RET-rearranged", "ret-rearranged")]
    fn given_long_label_with_hyphenated_biomarker_when_sanitizing_then_biomarker_leads(
        #[case] label: &str,
        #[case] biomarker: &str,
    ) {
        let sanitizer = SearchTermSanitizer::default();

        let result = sanitizer.sanitize(label);

        assert!(result.starts_with(biomarker), "got {result:?}");
        assert!(result.split_whitespace().count() <= MAX_QUERY_WORDS);
    }

    #[rstest]
    #[case("")]
    #[case("(only a note)")]
    #[case("Stage IV, EGFR+ (exon 21 L858R) with brain metastases after osimertinib")]
    #[case("x) foo (egfr")]
    #[case("with and or, if; before: after+")]
    #[case("Pembrolizumab + carboplatin + pemetrexed + nivolumab + ipilimumab")]
    fn sanitize_is_idempotent_and_capped(#[case] input: &str) {
        let sanitizer = SearchTermSanitizer::default();
        let once = sanitizer.sanitize(input);
        let twice = sanitizer.sanitize(&once);
        assert_eq!(once, twice);
        assert!(once.split_whitespace().count() <= MAX_QUERY_WORDS);
    }

    #[test]
    fn given_disease_context_when_enriching_then_suffix_added_once() {
        let sanitizer = SearchTermSanitizer::default();
        assert_eq!(sanitizer.enrich("surgery", Some("NSCLC")), "surgery NSCLC");
        assert_eq!(sanitizer.enrich("nsclc surgery", Some("NSCLC")), "nsclc surgery");
        assert_eq!(sanitizer.enrich("surgery", None), "surgery");
        assert_eq!(sanitizer.enrich("", Some("NSCLC")), "");
    }

    #[test]
    fn given_only_noise_when_building_query_term_then_none() {
        let sanitizer = SearchTermSanitizer::default();
        assert_eq!(sanitizer.query_term("(see footnote) or an", Some("NSCLC")), None);
        assert_eq!(
            sanitizer.query_term("Surgical resection", Some("NSCLC")).as_deref(),
            Some("surgical resection NSCLC")
        );
    }
}
