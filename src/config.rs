//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/trialome/trialome.toml`
//! 3. Local config: `<data_dir>/.trialome.toml` (next to the graph documents)
//! 4. Environment variables: `TRIALOME_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;
use crate::domain::vocabulary::{self, Vocabulary};

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated, first occurrence keeps its position
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = overlay
        .iter()
        .filter_map(|p| p.strip_prefix('!'))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    base.iter()
        .chain(overlay.iter().filter(|p| !p.starts_with('!')))
        .filter(|item| !removed.contains(item.as_str()))
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

fn union_or_keep(base: &[String], overlay: &Option<Vec<String>>) -> Vec<String> {
    overlay
        .as_ref()
        .map(|o| merge_array(base, o))
        .unwrap_or_else(|| base.to_vec())
}

fn replace_or_keep(base: &[String], overlay: &Option<Vec<String>>) -> Vec<String> {
    overlay.clone().unwrap_or_else(|| base.to_vec())
}

// ============================================================
// DISEASE
// ============================================================

/// Disease context of the loaded pathway documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiseaseConfig {
    /// Short code used in tree ids and appended to registry queries
    pub code: String,
    pub full_name: String,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            code: "NSCLC".into(),
            full_name: "Non-Small Cell Lung Cancer".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDiseaseConfig {
    pub code: Option<String>,
    pub full_name: Option<String>,
}

impl DiseaseConfig {
    fn merge(&self, overlay: &RawDiseaseConfig) -> Self {
        Self {
            code: overlay.code.clone().unwrap_or_else(|| self.code.clone()),
            full_name: overlay
                .full_name
                .clone()
                .unwrap_or_else(|| self.full_name.clone()),
        }
    }
}

// ============================================================
// REGISTRY
// ============================================================

/// Remote trials registry endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// API root; `/studies` is appended
    pub base_url: String,
    /// Public search page used for "view all" links
    pub search_url: String,
    /// Overall-status filter applied to every query
    pub status: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://clinicaltrials.gov/api/v2".into(),
            search_url: "https://clinicaltrials.gov/search".into(),
            status: "RECRUITING".into(),
            page_size: 10,
            timeout_secs: 30,
            user_agent: format!("trialome/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRegistryConfig {
    pub base_url: Option<String>,
    pub search_url: Option<String>,
    pub status: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl RegistryConfig {
    fn merge(&self, overlay: &RawRegistryConfig) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            search_url: overlay
                .search_url
                .clone()
                .unwrap_or_else(|| self.search_url.clone()),
            status: overlay.status.clone().unwrap_or_else(|| self.status.clone()),
            page_size: overlay.page_size.unwrap_or(self.page_size),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            user_agent: overlay
                .user_agent
                .clone()
                .unwrap_or_else(|| self.user_agent.clone()),
        }
    }
}

// ============================================================
// VOCABULARY
// ============================================================

/// Keyword lists driving node classification and query sanitization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VocabularyConfig {
    pub header_labels: Vec<String>,
    pub header_prefixes: Vec<String>,
    pub treatment_terms: Vec<String>,
    pub condition_terms: Vec<String>,
    pub priority_terms: Vec<String>,
    pub generic_labels: Vec<String>,
    pub connector_words: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            header_labels: vocabulary::to_owned(vocabulary::HEADER_LABELS),
            header_prefixes: vocabulary::to_owned(vocabulary::HEADER_PREFIXES),
            treatment_terms: vocabulary::to_owned(vocabulary::TREATMENT_TERMS),
            condition_terms: vocabulary::to_owned(vocabulary::CONDITION_TERMS),
            priority_terms: vocabulary::to_owned(vocabulary::PRIORITY_TERMS),
            generic_labels: vocabulary::to_owned(vocabulary::GENERIC_LABELS),
            connector_words: vocabulary::to_owned(vocabulary::CONNECTOR_WORDS),
        }
    }
}

/// Raw vocabulary for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawVocabularyConfig {
    pub header_labels: Option<Vec<String>>,
    pub header_prefixes: Option<Vec<String>>,
    pub treatment_terms: Option<Vec<String>>,
    pub condition_terms: Option<Vec<String>>,
    pub priority_terms: Option<Vec<String>>,
    pub generic_labels: Option<Vec<String>>,
    pub connector_words: Option<Vec<String>>,
}

impl VocabularyConfig {
    /// Merge overlay onto self with union semantics (`!item` removes).
    pub fn merge(&self, overlay: &RawVocabularyConfig) -> Self {
        Self {
            header_labels: union_or_keep(&self.header_labels, &overlay.header_labels),
            header_prefixes: union_or_keep(&self.header_prefixes, &overlay.header_prefixes),
            treatment_terms: union_or_keep(&self.treatment_terms, &overlay.treatment_terms),
            condition_terms: union_or_keep(&self.condition_terms, &overlay.condition_terms),
            priority_terms: union_or_keep(&self.priority_terms, &overlay.priority_terms),
            generic_labels: union_or_keep(&self.generic_labels, &overlay.generic_labels),
            connector_words: union_or_keep(&self.connector_words, &overlay.connector_words),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Arrays specified globally REPLACE the compiled lists entirely.
    pub fn apply_global(&self, global: &RawVocabularyConfig) -> Self {
        Self {
            header_labels: replace_or_keep(&self.header_labels, &global.header_labels),
            header_prefixes: replace_or_keep(&self.header_prefixes, &global.header_prefixes),
            treatment_terms: replace_or_keep(&self.treatment_terms, &global.treatment_terms),
            condition_terms: replace_or_keep(&self.condition_terms, &global.condition_terms),
            priority_terms: replace_or_keep(&self.priority_terms, &global.priority_terms),
            generic_labels: replace_or_keep(&self.generic_labels, &global.generic_labels),
            connector_words: replace_or_keep(&self.connector_words, &global.connector_words),
        }
    }

    /// Normalized domain vocabulary.
    pub fn to_vocabulary(&self) -> Vocabulary {
        Vocabulary::new(
            &self.header_labels,
            &self.header_prefixes,
            &self.treatment_terms,
            &self.condition_terms,
            &self.priority_terms,
            &self.generic_labels,
            &self.connector_words,
        )
    }
}

// ============================================================
// SETTINGS
// ============================================================

/// Unified configuration for trialome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `*.dag.json` graph documents
    pub data_dir: PathBuf,
    /// Optional JSON trial-record data source
    pub trials_file: Option<PathBuf>,
    pub disease: DiseaseConfig,
    pub registry: RegistryConfig,
    pub vocabulary: VocabularyConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            trials_file: None,
            disease: DiseaseConfig::default(),
            registry: RegistryConfig::default(),
            vocabulary: VocabularyConfig::default(),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub trials_file: Option<PathBuf>,
    pub disease: RawDiseaseConfig,
    pub registry: RawRegistryConfig,
    pub vocabulary: RawVocabularyConfig,
}

/// Get the XDG config directory for trialome.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "trialome").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("trialome.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".trialome.toml")
}

/// Env keys parsed as comma-separated lists.
const LIST_KEYS: &[&str] = &[
    "vocabulary.header_labels",
    "vocabulary.header_prefixes",
    "vocabulary.treatment_terms",
    "vocabulary.condition_terms",
    "vocabulary.priority_terms",
    "vocabulary.generic_labels",
    "vocabulary.connector_words",
];

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Domain vocabulary built from the configured keyword lists.
    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary.to_vocabulary()
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.data_dir = PathBuf::from(expand_env_vars(&self.data_dir.to_string_lossy()));
        self.trials_file = self
            .trials_file
            .as_ref()
            .map(|p| PathBuf::from(expand_env_vars(&p.to_string_lossy())));
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            trials_file: overlay
                .trials_file
                .clone()
                .or_else(|| self.trials_file.clone()),
            disease: self.disease.merge(&overlay.disease),
            registry: self.registry.merge(&overlay.registry),
            vocabulary: self.vocabulary.merge(&overlay.vocabulary),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            data_dir: global
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            trials_file: global
                .trials_file
                .clone()
                .or_else(|| self.trials_file.clone()),
            disease: self.disease.merge(&global.disease),
            registry: self.registry.merge(&global.registry),
            vocabulary: self.vocabulary.apply_global(&global.vocabulary),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Optional data directory; wins over every layer and
    ///   locates the local config file
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        current = current.apply_local(data_dir)?;
        current = Self::apply_env_overrides(current)?;

        if let Some(dir) = data_dir {
            current.data_dir = dir.to_path_buf();
        }
        current.expand_paths();

        Ok(current)
    }

    /// Merge the local config of `data_dir` (or the configured one) if present.
    fn apply_local(self, data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let dir = data_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(expand_env_vars(&self.data_dir.to_string_lossy())));
        let local_path = local_config_path(&dir);
        if !local_path.exists() {
            return Ok(self);
        }
        let raw = load_raw_settings(&local_path)?;
        Ok(self.merge_with(&raw))
    }

    /// Apply TRIALOME_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let mut env = Environment::with_prefix("TRIALOME")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",");
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }

        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("trials_file") {
            settings.trials_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("disease.code") {
            settings.disease.code = val;
        }
        if let Ok(val) = config.get_string("disease.full_name") {
            settings.disease.full_name = val;
        }
        if let Ok(val) = config.get_string("registry.base_url") {
            settings.registry.base_url = val;
        }
        if let Ok(val) = config.get_string("registry.search_url") {
            settings.registry.search_url = val;
        }
        if let Ok(val) = config.get_string("registry.status") {
            settings.registry.status = val;
        }
        if let Ok(val) = config.get::<u32>("registry.page_size") {
            settings.registry.page_size = val;
        }
        if let Ok(val) = config.get::<u64>("registry.timeout_secs") {
            settings.registry.timeout_secs = val;
        }
        if let Ok(val) = config.get_string("registry.user_agent") {
            settings.registry.user_agent = val;
        }

        let vocab = &mut settings.vocabulary;
        let lists: [(&str, &mut Vec<String>); 7] = [
            ("vocabulary.header_labels", &mut vocab.header_labels),
            ("vocabulary.header_prefixes", &mut vocab.header_prefixes),
            ("vocabulary.treatment_terms", &mut vocab.treatment_terms),
            ("vocabulary.condition_terms", &mut vocab.condition_terms),
            ("vocabulary.priority_terms", &mut vocab.priority_terms),
            ("vocabulary.generic_labels", &mut vocab.generic_labels),
            ("vocabulary.connector_words", &mut vocab.connector_words),
        ];
        for (key, target) in lists {
            if let Ok(val) = config.get::<Vec<String>>(key) {
                *target = val;
            }
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# trialome configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/trialome/trialome.toml  (defines your baseline)
#   Local:  <data_dir>/.trialome.toml         (dataset-specific additions)
#   Env:    TRIALOME_* environment variables   (explicit overrides,
#           nested keys use "__", e.g. TRIALOME_REGISTRY__PAGE_SIZE=20)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     treatment_terms = ["radiotherapy", "!observation"]

# Directory containing *.dag.json pathway documents (or manifest.json)
# data_dir = "data"

# JSON array of trial records for the `trials` command
# trials_file = "data/trials.json"

[disease]
# code = "NSCLC"
# full_name = "Non-Small Cell Lung Cancer"

[registry]
# base_url = "https://clinicaltrials.gov/api/v2"
# search_url = "https://clinicaltrials.gov/search"
# status = "RECRUITING"
# page_size = 10
# timeout_secs = 30

[vocabulary]
# Column headers (exact, case-insensitive)
# header_labels = ["clinical presentation", "workup", "primary treatment"]

# Label prefixes that mark cross-references
# header_prefixes = ["see", "refer to"]

# Keywords placed first in registry queries
# priority_terms = ["osimertinib", "egfr", "stage"]

# Words removed from registry queries
# connector_words = ["or", "and", "if", "after", "before", "with", "without"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_default_settings_when_created_then_registry_defaults_match_public_api() {
        let settings = Settings::default();
        assert_eq!(settings.registry.status, "RECRUITING");
        assert_eq!(settings.registry.page_size, 10);
        assert_eq!(settings.disease.code, "NSCLC");
        assert!(settings.trials_file.is_none());
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/pathways"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.data_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "data_dir should start with home: {dir}");
        assert!(!dir.contains('~'));
    }

    #[test]
    fn test_merge_array_union() {
        let result = merge_array(&strings(&["a", "b"]), &strings(&["c"]));
        assert_eq!(result, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_array_negation() {
        let result = merge_array(&strings(&["a", "b"]), &strings(&["!a", "c"]));
        assert_eq!(result, strings(&["b", "c"]));
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let result = merge_array(&strings(&["a"]), &strings(&["!zzz"]));
        assert_eq!(result, strings(&["a"]));
    }

    #[test]
    fn test_merge_array_duplicates() {
        let result = merge_array(&strings(&["a", "b"]), &strings(&["b", "a", "c"]));
        assert_eq!(result, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_vocabulary_merge_unions_and_negates() {
        let base = VocabularyConfig::default();
        let overlay = RawVocabularyConfig {
            treatment_terms: Some(strings(&["radiotherapy", "!observation"])),
            ..Default::default()
        };

        let merged = base.merge(&overlay);

        assert!(merged.treatment_terms.contains(&"radiotherapy".to_string()));
        assert!(!merged.treatment_terms.contains(&"observation".to_string()));
        assert_eq!(merged.condition_terms, base.condition_terms);
    }

    #[test]
    fn test_apply_global_replaces_arrays() {
        let base = Settings::default();
        let global = RawSettings {
            vocabulary: RawVocabularyConfig {
                priority_terms: Some(strings(&["imatinib"])),
                ..Default::default()
            },
            registry: RawRegistryConfig {
                page_size: Some(25),
                ..Default::default()
            },
            ..Default::default()
        };

        let applied = base.apply_global(&global);

        assert_eq!(applied.vocabulary.priority_terms, strings(&["imatinib"]));
        assert_eq!(applied.vocabulary.header_labels, base.vocabulary.header_labels);
        assert_eq!(applied.registry.page_size, 25);
        assert_eq!(applied.registry.status, "RECRUITING");
    }

    #[test]
    fn test_template_parses_as_raw_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_dir.is_none());
        assert!(raw.vocabulary.priority_terms.is_none());
    }

    #[test]
    fn test_to_toml_roundtrips_through_raw_settings() {
        let settings = Settings::default();
        let text = settings.to_toml().expect("serialize");

        let raw: RawSettings = toml::from_str(&text).expect("parse");
        let restored = Settings::default().merge_with(&raw);

        assert_eq!(restored.vocabulary, settings.vocabulary);
        assert_eq!(restored.registry, settings.registry);
    }
}
