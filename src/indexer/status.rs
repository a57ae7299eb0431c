use crate::error::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `Idle` until a run starts; a stored status never returns to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexerState {
    #[default]
    Idle,
    Preparing,
    Running,
    Finished,
    Aborted,
}

/// Progress of one indexer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    pub state: IndexerState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub updated: usize,
    pub errors: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepare_message: Option<String>,
}

impl IndexerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self.state, IndexerState::Preparing | IndexerState::Running)
    }

    /// `RUNNING 120/500 (skipped 3, errors 1)`.
    pub fn status_line(&self) -> String {
        let state = match self.state {
            IndexerState::Idle => "IDLE",
            IndexerState::Preparing => "PREPARING",
            IndexerState::Running => "RUNNING",
            IndexerState::Finished => "FINISHED",
            IndexerState::Aborted => "ABORTED",
        };
        let mut line = format!(
            "{} {}/{} (skipped {}, errors {})",
            state, self.processed, self.total, self.skipped, self.errors
        );
        if let Some(message) = &self.prepare_message {
            if self.state == IndexerState::Preparing {
                line.push_str(": ");
                line.push_str(message);
            }
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            line.push_str(&format!(" in {}s", (end - start).num_seconds().max(0)));
        }
        line
    }
}

/// Durable status records, keyed by `<index>-<source>`.
///
/// Missing records load as the default status. Writers to the same key are
/// not synchronized.
pub trait IndexerStatusStore: Send + Sync {
    fn load(&self, key: &str) -> Result<IndexerStatus>;

    fn store(&self, key: &str, status: &IndexerStatus) -> Result<()>;
}

pub fn status_key(index: &str, source: &str) -> String {
    format!("{}-{}", index, source)
}

/// One JSON file per key: `<work_dir>/background-indexer-status-<key>.json`.
#[derive(Debug, Clone)]
pub struct FileIndexerStatusStore {
    work_dir: PathBuf,
}

impl FileIndexerStatusStore {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        FileIndexerStatusStore {
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.work_dir
            .join(format!("background-indexer-status-{}.json", key))
    }
}

impl IndexerStatusStore for FileIndexerStatusStore {
    fn load(&self, key: &str) -> Result<IndexerStatus> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(IndexerStatus::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, key: &str, status: &IndexerStatus) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(status)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryIndexerStatusStore {
    records: DashMap<String, IndexerStatus>,
}

impl MemoryIndexerStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexerStatusStore for MemoryIndexerStatusStore {
    fn load(&self, key: &str) -> Result<IndexerStatus> {
        Ok(self
            .records
            .get(key)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    fn store(&self, key: &str, status: &IndexerStatus) -> Result<()> {
        self.records.insert(key.to_string(), status.clone());
        Ok(())
    }
}
