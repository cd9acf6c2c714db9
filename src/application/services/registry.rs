//! Graph loading and the read-only tree registry
//!
//! Discovers graph documents in a data directory, builds one classified tree
//! per document and collects them into an immutable [`TreeRegistry`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::DiseaseConfig;
use crate::domain::{Footnote, GraphDocument, TreeBuilder, TreeNode};
use crate::infrastructure::traits::FileSystem;

/// Optional file listing the documents to load, in order.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Suffix of graph documents found by directory scan.
pub const GRAPH_SUFFIX: &str = ".dag.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    files: Vec<String>,
}

/// A built tree plus the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTree {
    pub tree_id: String,
    pub root: TreeNode,
    pub raw: GraphDocument,
    pub footnotes: Vec<Footnote>,
    pub disease: String,
    pub disease_full_name: String,
}

/// A document that could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: String,
}

/// Outcome of one loading pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Registered tree ids, in load order
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedDocument>,
}

impl LoadReport {
    fn skip(&mut self, source: impl Into<String>, reason: impl ToString) {
        let source = source.into();
        let reason = reason.to_string();
        warn!(%source, %reason, "skipping graph document");
        self.skipped.push(SkippedDocument { source, reason });
    }
}

/// Immutable mapping from tree id to its registered tree.
#[derive(Debug, Clone, Default)]
pub struct TreeRegistry {
    trees: BTreeMap<String, RegisteredTree>,
}

impl TreeRegistry {
    /// Build a registry from `(tree_id, document)` pairs.
    ///
    /// Malformed documents and duplicate ids are skipped; the first document
    /// claiming an id wins.
    pub fn from_documents<I>(
        builder: &TreeBuilder,
        disease: &DiseaseConfig,
        documents: I,
    ) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = (String, GraphDocument)>,
    {
        let mut trees = BTreeMap::new();
        let mut report = LoadReport::default();

        for (tree_id, document) in documents {
            if trees.contains_key(&tree_id) {
                report.skip(&tree_id, format!("duplicate tree id: {tree_id}"));
                continue;
            }
            match builder.build(&tree_id, &document) {
                Ok(root) => {
                    debug!(%tree_id, nodes = root.node_count(), "tree built");
                    let entry = RegisteredTree {
                        tree_id: tree_id.clone(),
                        root,
                        footnotes: document.footnotes.clone(),
                        raw: document,
                        disease: disease.code.clone(),
                        disease_full_name: disease.full_name.clone(),
                    };
                    report.loaded.push(tree_id.clone());
                    trees.insert(tree_id, entry);
                }
                Err(e) => report.skip(&tree_id, e),
            }
        }

        (Self { trees }, report)
    }

    pub fn get(&self, tree_id: &str) -> Option<&RegisteredTree> {
        self.trees.get(tree_id)
    }

    /// Like [`get`](Self::get) but reports an unknown id as an error.
    pub fn require(&self, tree_id: &str) -> ApplicationResult<&RegisteredTree> {
        self.get(tree_id)
            .ok_or_else(|| ApplicationError::TreeNotFound(tree_id.to_string()))
    }

    /// Tree ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTree> {
        self.trees.values()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Footnotes of the owning tree referenced by `node`, in the node's label order.
    ///
    /// Labels without a matching footnote are ignored.
    pub fn footnotes_for(&self, tree_id: &str, node: &TreeNode) -> Vec<&Footnote> {
        let Some(tree) = self.get(tree_id) else {
            return Vec::new();
        };
        node.footnote_labels
            .iter()
            .filter_map(|label| tree.footnotes.iter().find(|f| &f.label == label))
            .collect()
    }
}

/// Loads graph documents from a data directory into a [`TreeRegistry`].
pub struct RegistryLoader {
    fs: Arc<dyn FileSystem>,
    builder: TreeBuilder,
    disease: DiseaseConfig,
    page_pattern: Regex,
}

impl RegistryLoader {
    pub fn new(fs: Arc<dyn FileSystem>, builder: TreeBuilder, disease: DiseaseConfig) -> Self {
        Self {
            fs,
            builder,
            disease,
            page_pattern: Regex::new(r"_page-(\d+)").expect("valid page pattern"),
        }
    }

    /// Load every graph document in `data_dir`.
    ///
    /// Only a missing data directory or an unreadable manifest fails the
    /// whole pass; individual documents are skipped and reported.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, data_dir: &Path) -> ApplicationResult<(TreeRegistry, LoadReport)> {
        if !self.fs.is_dir(data_dir) {
            return Err(ApplicationError::OperationFailed {
                context: format!("data directory not found: {}", data_dir.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "directory does not exist",
                )),
            });
        }

        let files = self.discover(data_dir)?;
        debug!(count = files.len(), "graph documents discovered");

        let mut early = LoadReport::default();
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let source = path.display().to_string();
            let content = match self.fs.read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    early.skip(source, e);
                    continue;
                }
            };
            match GraphDocument::from_json(&content, &source) {
                Ok(document) => {
                    let tree_id = self.tree_id_for(&path, &document);
                    documents.push((tree_id, document));
                }
                Err(e) => early.skip(source, e),
            }
        }

        let (registry, mut report) =
            TreeRegistry::from_documents(&self.builder, &self.disease, documents);
        early.skipped.append(&mut report.skipped);
        report.skipped = early.skipped;

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "tree registry loaded"
        );
        Ok((registry, report))
    }

    /// Document paths from the manifest, or a sorted scan for `*.dag.json`.
    fn discover(&self, data_dir: &Path) -> ApplicationResult<Vec<PathBuf>> {
        let manifest_path = data_dir.join(MANIFEST_FILE);
        if self.fs.is_file(&manifest_path) {
            let content = self
                .fs
                .read_to_string(&manifest_path)
                .with_path_context("read manifest", &manifest_path)?;
            let manifest: Manifest =
                serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
                    context: format!("parse manifest {}", manifest_path.display()),
                    source: Box::new(e),
                })?;
            debug!(files = manifest.files.len(), "using manifest");
            return Ok(manifest.files.iter().map(|f| data_dir.join(f)).collect());
        }

        let files = self
            .fs
            .list_files(data_dir)
            .with_path_context("list data directory", data_dir)?;
        Ok(files
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(GRAPH_SUFFIX))
            })
            .collect())
    }

    /// The document's declared id, else one derived from the filename.
    pub fn tree_id_for(&self, path: &Path, document: &GraphDocument) -> String {
        if let Some(id) = document.declared_tree_id() {
            return id.to_string();
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.derive_tree_id(&file_name)
    }

    /// `nscl_page-0023.dag.json` → `NSCLC_0023`; otherwise the stem.
    pub fn derive_tree_id(&self, file_name: &str) -> String {
        if let Some(caps) = self.page_pattern.captures(file_name) {
            return format!("{}_{}", self.disease.code, &caps[1]);
        }
        file_name
            .strip_suffix(GRAPH_SUFFIX)
            .or_else(|| file_name.strip_suffix(".json"))
            .unwrap_or(file_name)
            .to_string()
    }
}
