#![allow(dead_code)]

use quarry::engine::{SearchEngineClient, SolrParams, UpdateBatch, UpdateResult};
use quarry::{
    Indexer, IndexerConfiguration, JsonResourceLoader, QuarryConfig, QuarryError, Result,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory engine recording every call.
pub struct RecordingEngine {
    indexes: Vec<String>,
    pub updates: Mutex<Vec<UpdateBatch>>,
    pub deletes: Mutex<Vec<(String, String)>>,
    pub commits: Mutex<Vec<String>>,
    pub optimizes: Mutex<Vec<String>>,
    pub selects: Mutex<Vec<(String, SolrParams)>>,
    reject_status: Mutex<Option<i64>>,
    select_response: Mutex<Value>,
}

impl RecordingEngine {
    pub fn new(indexes: &[&str]) -> Self {
        RecordingEngine {
            indexes: indexes.iter().map(|s| s.to_string()).collect(),
            updates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            optimizes: Mutex::new(Vec::new()),
            selects: Mutex::new(Vec::new()),
            reject_status: Mutex::new(None),
            select_response: Mutex::new(json!({})),
        }
    }

    pub fn reject_updates(&self, status: i64) {
        *self.reject_status.lock().unwrap() = Some(status);
    }

    pub fn respond_with(&self, response: Value) {
        *self.select_response.lock().unwrap() = response;
    }

    /// Batch sizes per index, in submission order.
    pub fn batch_sizes(&self, index: &str) -> Vec<usize> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.index == index)
            .map(UpdateBatch::len)
            .collect()
    }

    pub fn submitted_ids(&self, index: &str) -> Vec<String> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.index == index)
            .flat_map(|b| b.documents.iter())
            .filter_map(|d| d.get("sp_id").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }
}

impl SearchEngineClient for RecordingEngine {
    fn update(&self, batch: UpdateBatch) -> Result<UpdateResult> {
        self.updates.lock().unwrap().push(batch);
        Ok(match *self.reject_status.lock().unwrap() {
            Some(status) => UpdateResult {
                status,
                status_message: "rejected".to_string(),
            },
            None => UpdateResult::success(),
        })
    }

    fn delete_by_query(&self, index: &str, query: &str) -> Result<()> {
        self.deletes
            .lock()
            .unwrap()
            .push((index.to_string(), query.to_string()));
        Ok(())
    }

    fn commit(&self, index: &str) -> Result<()> {
        self.commits.lock().unwrap().push(index.to_string());
        Ok(())
    }

    fn optimize(&self, index: &str) -> Result<()> {
        self.optimizes.lock().unwrap().push(index.to_string());
        Ok(())
    }

    fn available_indexes(&self) -> Result<Vec<String>> {
        Ok(self.indexes.clone())
    }

    fn select(&self, index: &str, params: &SolrParams) -> Result<Value> {
        self.selects
            .lock()
            .unwrap()
            .push((index.to_string(), params.clone()));
        let response = self.select_response.lock().unwrap().clone();
        if response.is_null() {
            return Err(QuarryError::SearchEngine("no response".to_string()));
        }
        Ok(response)
    }
}

pub fn write_resource(root: &Path, location: &str, content: &Value) {
    write_raw(root, location, &content.to_string());
}

pub fn write_raw(root: &Path, location: &str, content: &str) {
    let path = root.join(location.trim_start_matches('/'));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A minimal indexable page.
pub fn page(id: &str, headline: &str) -> Value {
    json!({
        "id": id,
        "name": id,
        "objectType": "content",
        "init": {"url": format!("/{}.php", id), "changed": 1_700_000_000},
        "metadata": {"headline": headline}
    })
}

/// Resource tree, work dir and engine of one test.
pub struct Fixture {
    pub dir: TempDir,
    pub config: QuarryConfig,
    pub engine: Arc<RecordingEngine>,
}

impl Fixture {
    pub fn new(indexes: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let config = QuarryConfig {
            resource_dir: dir.path().join("resources"),
            work_dir: dir.path().join("var"),
            ..Default::default()
        };
        std::fs::create_dir_all(&config.resource_dir).unwrap();
        Fixture {
            dir,
            config,
            engine: Arc::new(RecordingEngine::new(indexes)),
        }
    }

    pub fn resources(&self) -> &Path {
        &self.config.resource_dir
    }

    pub fn add(&self, location: &str, content: Value) {
        write_resource(self.resources(), location, &content);
    }

    pub fn add_pages(&self, dir: &str, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let id = format!("p{:03}", i);
                let location = format!("{}/{}.json", dir, id);
                self.add(&location, page(&id, &format!("Page {}", i)));
                location
            })
            .collect()
    }

    pub fn loader(&self) -> Arc<JsonResourceLoader> {
        Arc::new(JsonResourceLoader::new(self.resources()))
    }

    pub fn indexer(&self) -> Indexer {
        Indexer::new(
            &self.config,
            IndexerConfiguration::new("internal", "Internal resources"),
            self.loader(),
            Arc::clone(&self.engine) as Arc<dyn SearchEngineClient>,
        )
    }
}
