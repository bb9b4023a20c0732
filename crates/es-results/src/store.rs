//! File-backed history store used when no hosted backend is configured.
//!
//! Layout: `<root>/<record id>.json`, one pretty-printed record per file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::types::{NewSimulationRecord, SimulationRecord};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone)]
pub struct HistoryStore {
    root_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn record_path(&self, id: &str) -> ResultsResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(ResultsError::InvalidPath {
                message: format!("record id {id:?} is not a file name"),
            });
        }
        Ok(self.root_dir.join(format!("{id}.json")))
    }

    /// Stores a new record owned by `user_id` and returns it with its
    /// assigned id and creation time.
    pub fn insert(
        &self,
        user_id: &str,
        new: NewSimulationRecord,
    ) -> ResultsResult<SimulationRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let record = SimulationRecord::from_new(id, user_id.to_string(), Utc::now(), new);
        let path = self.record_path(&record.id)?;
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        debug!(id = %record.id, path = %path.display(), "saved simulation record");
        Ok(record)
    }

    fn load(&self, id: &str) -> ResultsResult<Option<SimulationRecord>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Records of `user_id`, newest first. Unreadable files are skipped.
    pub fn list(&self, user_id: &str) -> ResultsResult<Vec<SimulationRecord>> {
        let mut records = Vec::new();
        if !self.root_dir.exists() {
            return Ok(records);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<SimulationRecord>(&content) {
                Ok(record) if record.user_id == user_id => records.push(record),
                Ok(_) => {}
                Err(err) => debug!(path = %path.display(), %err, "skipping unreadable record"),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub fn get(&self, user_id: &str, id: &str) -> ResultsResult<SimulationRecord> {
        match self.load(id)? {
            Some(record) if record.user_id == user_id => Ok(record),
            _ => Err(ResultsError::RecordNotFound { id: id.to_string() }),
        }
    }

    /// Deletes a record owned by `user_id`; other users' records are untouched.
    pub fn delete(&self, user_id: &str, id: &str) -> ResultsResult<()> {
        match self.load(id)? {
            Some(record) if record.user_id == user_id => {
                fs::remove_file(self.record_path(id)?)?;
                Ok(())
            }
            _ => Err(ResultsError::RecordNotFound { id: id.to_string() }),
        }
    }
}
