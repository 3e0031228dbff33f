//! Integral term storage API.

use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persisted integral state of one control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralRecord {
    pub loop_id: String,
    pub integral_term: f64,
    pub saved_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct IntegralStore {
    root_dir: PathBuf,
}

impl IntegralStore {
    pub fn new(root_dir: PathBuf) -> StoreResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn record_path(&self, loop_id: &str) -> StoreResult<PathBuf> {
        check_loop_id(loop_id)?;
        Ok(self.root_dir.join(format!("{loop_id}.json")))
    }

    pub fn save(&self, loop_id: &str, integral_term: f64) -> StoreResult<IntegralRecord> {
        let path = self.record_path(loop_id)?;
        if !integral_term.is_finite() {
            return Err(StoreError::NonFinite {
                loop_id: loop_id.to_string(),
                value: integral_term,
            });
        }

        let record = IntegralRecord {
            loop_id: loop_id.to_string(),
            integral_term,
            saved_at: Utc::now(),
        };

        // Write-then-rename so a crash never leaves a truncated record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&record)?)?;
        fs::rename(&tmp, &path)?;

        debug!(loop_id, integral_term, "integral term saved");
        Ok(record)
    }

    /// Stored record, or `None` when the loop has never been saved.
    pub fn load(&self, loop_id: &str) -> StoreResult<Option<IntegralRecord>> {
        let path = self.record_path(loop_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let record: IntegralRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    pub fn delete(&self, loop_id: &str) -> StoreResult<()> {
        let path = self.record_path(loop_id)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn list(&self) -> StoreResult<Vec<IntegralRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            if let Ok(record) = serde_json::from_str::<IntegralRecord>(&content) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.loop_id.cmp(&b.loop_id));
        Ok(records)
    }
}

fn check_loop_id(loop_id: &str) -> StoreResult<()> {
    let valid = !loop_id.is_empty()
        && loop_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidLoopId {
            loop_id: loop_id.to_string(),
        })
    }
}
