//! Client for the hosted Algolia search index.
//!
//! Reads go to the DSN host and are retried on transport errors and 5xx
//! responses. Index replacement follows the copy/batch/move sequence so the
//! live index is swapped in one step.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{DomainError, IndexRecord, SearchHit, SearchIndex};
use crate::infrastructure::config::SearchConfig;

const USER_AGENT: &str = "audiobooks/1.0";
const BATCH_SIZE: usize = 1000;
const TASK_POLL_ATTEMPTS: u32 = 120;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    #[serde(rename = "taskID")]
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
}

pub struct AlgoliaClient {
    http: reqwest::Client,
    config: SearchConfig,
    max_attempts: u32,
    retry_delay: Duration,
    poll_interval: Duration,
}

impl AlgoliaClient {
    pub fn new(config: SearchConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            http,
            config,
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
            poll_interval: Duration::from_millis(500),
        })
    }

    /// Override retry and task polling timings (tests use near-zero delays).
    pub fn with_timings(
        mut self,
        max_attempts: u32,
        retry_delay: Duration,
        poll_interval: Duration,
    ) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self.poll_interval = poll_interval;
        self
    }

    fn read_host(&self) -> String {
        match &self.config.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", self.config.application_id),
        }
    }

    fn write_host(&self) -> String {
        match &self.config.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.algolia.net", self.config.application_id),
        }
    }

    fn index_path(index: &str) -> String {
        format!("/1/indexes/{}", urlencoding::encode(index))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        api_key: &str,
    ) -> Result<reqwest::Response, DomainError> {
        let response = request
            .header("X-Algolia-Application-Id", &self.config.application_id)
            .header("X-Algolia-API-Key", api_key)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::External(format!(
                "Search service returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn write_operation(&self, url: String, body: Value) -> Result<i64, DomainError> {
        let key = self.config.require_modify_key()?;
        let response = self.send(self.http.post(&url).json(&body), key).await?;
        let task: TaskResponse = response
            .json()
            .await
            .map_err(|e| DomainError::External(format!("Failed to parse JSON: {}", e)))?;
        Ok(task.task_id)
    }

    async fn wait_task(&self, index: &str, task_id: i64) -> Result<(), DomainError> {
        let key = self.config.require_modify_key()?;
        let url = format!(
            "{}{}/task/{}",
            self.write_host(),
            Self::index_path(index),
            task_id
        );

        for _ in 0..TASK_POLL_ATTEMPTS {
            let response = self.send(self.http.get(&url), key).await?;
            let status: TaskStatus = response
                .json()
                .await
                .map_err(|e| DomainError::External(format!("Failed to parse JSON: {}", e)))?;
            if status.status == "published" {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(DomainError::External(format!(
            "Task {} on index {} was not published in time",
            task_id, index
        )))
    }
}

/// Retry only what may succeed on a second try.
fn is_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.is_request()
        || err.status().is_some_and(|s| s.is_server_error())
}

#[async_trait]
impl SearchIndex for AlgoliaClient {
    async fn search(&self, query: &str, max_hits: usize) -> Result<Vec<SearchHit>, DomainError> {
        let key = self.config.require_search_key()?;
        let url = format!(
            "{}{}/query",
            self.read_host(),
            Self::index_path(&self.config.index)
        );
        let body = json!({ "query": query, "hitsPerPage": max_hits });

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self
                .http
                .post(&url)
                .header("X-Algolia-Application-Id", &self.config.application_id)
                .header("X-Algolia-API-Key", key)
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(response) => {
                    let parsed: QueryResponse = response.json().await.map_err(|e| {
                        DomainError::External(format!("Failed to parse JSON: {}", e))
                    })?;
                    let mut hits = parsed.hits;
                    hits.truncate(max_hits);
                    return Ok(hits);
                }
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    tracing::warn!(
                        "Search request failed (attempt {}/{}): {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => {
                    return Err(DomainError::External(format!("Search request failed: {}", e)));
                }
            }
        }
    }

    async fn replace_all(&self, records: Vec<IndexRecord>) -> Result<(), DomainError> {
        // Fail before touching the service if the write key is missing.
        self.config.require_modify_key()?;

        let index = self.config.index.clone();
        let tmp_index = format!("{}_tmp_{}", index, uuid::Uuid::new_v4().simple());
        let write_host = self.write_host();

        let copy_task = self
            .write_operation(
                format!("{}{}/operation", write_host, Self::index_path(&index)),
                json!({
                    "operation": "copy",
                    "destination": tmp_index,
                    "scope": ["settings", "synonyms", "rules"],
                }),
            )
            .await?;
        self.wait_task(&index, copy_task).await?;

        let mut batch_tasks = Vec::new();
        for chunk in records.chunks(BATCH_SIZE) {
            let requests: Vec<Value> = chunk
                .iter()
                .map(|record| json!({ "action": "addObject", "body": record }))
                .collect();
            let task = self
                .write_operation(
                    format!("{}{}/batch", write_host, Self::index_path(&tmp_index)),
                    json!({ "requests": requests }),
                )
                .await?;
            batch_tasks.push(task);
        }
        for task in batch_tasks {
            self.wait_task(&tmp_index, task).await?;
        }

        let move_task = self
            .write_operation(
                format!("{}{}/operation", write_host, Self::index_path(&tmp_index)),
                json!({ "operation": "move", "destination": index }),
            )
            .await?;
        self.wait_task(&tmp_index, move_task).await?;

        tracing::info!("Replaced search index {} with {} records", index, records.len());
        Ok(())
    }
}
