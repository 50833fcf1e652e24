use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use iat_core::TrialResult;
use serde::{Deserialize, Serialize};

use crate::sink::{ResultSink, STATUS_COMPLETED, SaveError, SaveReceipt, Session};

/// One row of the results table, keyed by user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub results: Vec<TrialResult>,
    pub status: String,
    pub referrer: String,
}

impl StoredRow {
    pub fn completed(session: &Session, results: &[TrialResult]) -> Self {
        Self {
            results: results.to_vec(),
            status: STATUS_COMPLETED.to_string(),
            referrer: session.referrer.clone(),
        }
    }
}

/// Results table kept as one JSON object `{ user_id: row }` on disk.
///
/// Each save reads the table, upserts the row and replaces the file through
/// a sibling temp file, so a crash mid-write leaves the old table intact.
/// Writers in separate processes are not coordinated; the last rename wins.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current table contents. A missing or empty file is an empty table.
    pub fn load(&self) -> Result<BTreeMap<String, StoredRow>, SaveError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn store(&self, table: &BTreeMap<String, StoredRow>) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let written = fs::write(&tmp, serde_json::to_vec_pretty(table)?)
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn save_results(
        &self,
        session: &Session,
        results: &[TrialResult],
    ) -> Result<SaveReceipt, SaveError> {
        let mut table = self.load()?;
        let replaced = table
            .insert(session.user_id.clone(), StoredRow::completed(session, results))
            .is_some();
        self.store(&table)?;

        tracing::debug!(
            path = %self.path.display(),
            user_id = %session.user_id,
            rows = table.len(),
            "Results table written"
        );

        Ok(SaveReceipt {
            user_id: session.user_id.clone(),
            records: results.len(),
            replaced,
        })
    }
}
