//! Blocking Solr client implementing [`quarry::SearchEngineClient`].

use quarry::engine::{SearchEngineClient, SolrParams, UpdateBatch, UpdateResult};
use quarry::error::{QuarryError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct ResponseHeader {
    #[serde(default)]
    status: i64,
}

#[derive(Debug, Default, Deserialize)]
struct SolrError {
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    response_header: ResponseHeader,
    #[serde(default)]
    error: Option<SolrError>,
}

/// Talks to a Solr instance at `base_url` (e.g. `http://127.0.0.1:8983/solr`);
/// every index is a core below it.
pub struct SolrClient {
    base_url: String,
    http_client: reqwest::blocking::Client,
}

impl SolrClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        SolrClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn update_url(&self, index: &str) -> String {
        format!("{}/{}/update?wt=json", self.base_url, index)
    }

    fn post_update(&self, index: &str, body: &Value) -> Result<UpdateResult> {
        let response = self
            .http_client
            .post(self.update_url(index))
            .json(body)
            .send()
            .map_err(|e| QuarryError::SearchEngine(format!("update of {} failed: {}", index, e)))?;

        let http_status = response.status();
        let text = response
            .text()
            .map_err(|e| QuarryError::SearchEngine(format!("update of {} failed: {}", index, e)))?;

        match serde_json::from_str::<UpdateResponse>(&text) {
            Ok(parsed) => {
                let status = match parsed.response_header.status {
                    0 if !http_status.is_success() => i64::from(http_status.as_u16()),
                    status => status,
                };
                Ok(UpdateResult {
                    status,
                    status_message: parsed.error.map(|e| e.msg).unwrap_or_default(),
                })
            }
            Err(_) if http_status.is_success() => Ok(UpdateResult::success()),
            Err(_) => Err(QuarryError::SearchEngine(format!(
                "{} returned {}: {}",
                index, http_status, text
            ))),
        }
    }

    fn expect_success(&self, index: &str, operation: &str, body: &Value) -> Result<()> {
        let result = self.post_update(index, body)?;
        if result.is_success() {
            Ok(())
        } else {
            Err(QuarryError::SearchEngine(format!(
                "{} of {} failed with status {}: {}",
                operation, index, result.status, result.status_message
            )))
        }
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| QuarryError::SearchEngine(format!("request to {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(QuarryError::SearchEngine(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        response
            .json()
            .map_err(|e| QuarryError::SearchEngine(format!("invalid response from {}: {}", url, e)))
    }
}

impl SearchEngineClient for SolrClient {
    fn update(&self, batch: UpdateBatch) -> Result<UpdateResult> {
        tracing::debug!("[SOLR {}] adding {} documents", batch.index, batch.len());
        let documents = Value::Array(batch.documents.into_iter().map(Value::Object).collect());
        self.post_update(&batch.index, &documents)
    }

    fn delete_by_query(&self, index: &str, query: &str) -> Result<()> {
        tracing::debug!("[SOLR {}] delete by query {}", index, query);
        self.expect_success(index, "delete", &json!({"delete": {"query": query}}))
    }

    fn commit(&self, index: &str) -> Result<()> {
        self.expect_success(index, "commit", &json!({"commit": {}}))
    }

    fn optimize(&self, index: &str) -> Result<()> {
        self.expect_success(index, "optimize", &json!({"optimize": {}}))
    }

    fn available_indexes(&self) -> Result<Vec<String>> {
        let url = format!("{}/admin/cores?action=STATUS&wt=json", self.base_url);
        let response = self.get_json(&url)?;
        let mut cores: Vec<String> = response["status"]
            .as_object()
            .map(|status| status.keys().cloned().collect())
            .unwrap_or_default();
        cores.sort();
        Ok(cores)
    }

    fn select(&self, index: &str, params: &SolrParams) -> Result<Value> {
        let url = format!("{}/{}/select", self.base_url, index);
        let response = self
            .http_client
            .post(&url)
            .form(params.pairs())
            .send()
            .map_err(|e| QuarryError::SearchEngine(format!("select on {} failed: {}", index, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuarryError::SearchEngine(format!(
                "select on {} returned {}: {}",
                index, status, body
            )));
        }
        response
            .json()
            .map_err(|e| QuarryError::SearchEngine(format!("invalid select response from {}: {}", index, e)))
    }
}
