//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::infrastructure::InfraResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, sorted by path.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Trial phase used to qualify registry queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialPhase {
    Phase1,
    Phase2,
    Phase3,
}

impl TrialPhase {
    pub const ALL: [TrialPhase; 3] = [TrialPhase::Phase1, TrialPhase::Phase2, TrialPhase::Phase3];

    /// Registry enumeration value (`PHASE1`, ...).
    pub fn as_registry_value(&self) -> &'static str {
        match self {
            TrialPhase::Phase1 => "PHASE1",
            TrialPhase::Phase2 => "PHASE2",
            TrialPhase::Phase3 => "PHASE3",
        }
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrialPhase::Phase1 => "Phase 1",
            TrialPhase::Phase2 => "Phase 2",
            TrialPhase::Phase3 => "Phase 3",
        };
        f.write_str(s)
    }
}

/// A free-text study search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyQuery {
    pub term: String,
    /// Overall-status filter, e.g. `RECRUITING`
    pub status: String,
    pub phase: Option<TrialPhase>,
    pub page_size: u32,
}

/// One study from a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySummary {
    pub nct_id: String,
    pub title: String,
}

/// Search result: total matches plus the first page of studies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudySearchResponse {
    pub total_count: u64,
    pub studies: Vec<StudySummary>,
}

/// Remote clinical-trials registry.
#[async_trait]
pub trait TrialRegistry: Send + Sync {
    /// Run one search. Network and parse failures are returned, never panicked.
    async fn search(&self, query: &StudyQuery) -> InfraResult<StudySearchResponse>;

    /// Public search-page URL listing every match for a term.
    fn search_page_url(&self, term: &str, status: &str) -> String;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
