//! Logical operations the indexer and the query layer need from a search engine.
//!
//! The wire protocol lives behind [`SearchEngineClient`]; `quarry-solr` ships an
//! HTTP implementation.

use crate::error::Result;
use serde_json::{Map, Value};

/// Documents collected for one update request against one index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBatch {
    pub index: String,
    pub documents: Vec<Map<String, Value>>,
}

impl UpdateBatch {
    pub fn new(index: impl Into<String>) -> Self {
        UpdateBatch {
            index: index.into(),
            documents: Vec::new(),
        }
    }

    pub fn add_document(&mut self, fields: Map<String, Value>) {
        self.documents.push(fields);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Engine answer to an update request. Status `0` means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub status: i64,
    pub status_message: String,
}

impl UpdateResult {
    pub fn success() -> Self {
        UpdateResult {
            status: 0,
            status_message: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Ordered request parameters. Keys may repeat (`fq`, `facet.field`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolrParams(Vec<(String, String)>);

impl SolrParams {
    pub fn new() -> Self {
        SolrParams(Vec::new())
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Replace every value of `key` with `value`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.retain(|(k, _)| k != key);
        self.0.push((key.to_string(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Search-engine client used by the indexer and the query layer.
///
/// Every call is blocking. Implementations must be shareable across threads.
pub trait SearchEngineClient: Send + Sync {
    fn create_update_batch(&self, index: &str) -> UpdateBatch {
        UpdateBatch::new(index)
    }

    /// Submit a batch of documents. Transport failures are `Err`, engine-side
    /// rejections are an `Ok` with a non-zero status.
    fn update(&self, batch: UpdateBatch) -> Result<UpdateResult>;

    fn delete_by_query(&self, index: &str, query: &str) -> Result<()>;

    fn commit(&self, index: &str) -> Result<()>;

    fn optimize(&self, index: &str) -> Result<()>;

    /// Names of the indexes the engine currently serves.
    fn available_indexes(&self) -> Result<Vec<String>>;

    /// Run a select request and return the raw JSON response.
    fn select(&self, index: &str, params: &SolrParams) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_keep_order_and_repeats() {
        let mut params = SolrParams::new();
        params.add("q", "*:*");
        params.add("fq", "a:b");
        params.add("fq", "c:d");
        assert_eq!(params.get_all("fq"), vec!["a:b", "c:d"]);
        params.set("q", "text");
        assert_eq!(params.get("q"), Some("text"));
        assert_eq!(params.pairs().last().unwrap().0, "q");
    }

    #[test]
    fn test_update_result_success() {
        assert!(UpdateResult::success().is_success());
        let failed = UpdateResult {
            status: 400,
            status_message: "bad".to_string(),
        };
        assert!(!failed.is_success());
    }
}
