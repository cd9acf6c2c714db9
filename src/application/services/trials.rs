//! Trial table loading

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::trial::RawTrialRecord;
use crate::domain::{TrialRecord, TrialTable};
use crate::infrastructure::traits::FileSystem;

/// Reads the pre-built trial-record data source.
pub struct TrialTableService {
    fs: Arc<dyn FileSystem>,
}

impl TrialTableService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a JSON array of raw records into a [`TrialTable`].
    ///
    /// Rows without an identifier are skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TrialTable> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read trials file", path)?;

        let rows: Vec<RawTrialRecord> =
            serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
                context: format!("parse trials file {}", path.display()),
                source: Box::new(e),
            })?;

        let total = rows.len();
        let records: Vec<TrialRecord> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let record = TrialRecord::from_raw(row);
                if record.is_none() {
                    warn!(row = i, "trial record without identifier skipped");
                }
                record
            })
            .collect();

        debug!(total, kept = records.len(), "trial rows mapped");
        info!(records = records.len(), path = %path.display(), "trial table loaded");
        Ok(TrialTable::new(records))
    }
}
