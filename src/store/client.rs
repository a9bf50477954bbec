//! HTTP client for the alerts index

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::model::AlertRecord;

/// Fixed page pulled per cycle; excess hits wait for a later pass
const FETCH_SIZE: usize = 10_000;

/// Bound on the whole fetch-and-decode step
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned status {0}")]
    Status(String),

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read and delete access to the alerts index
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Fetch one bounded page of raw alert hits
    async fn fetch(&self) -> Result<Vec<AlertRecord>, StoreError>;

    /// Remove the given documents from the index
    async fn delete(&self, record_ids: &[String]) -> Result<(), StoreError>;
}

#[derive(Serialize)]
struct SearchBody {
    #[serde(rename = "_source")]
    source: bool,
    size: usize,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    query: IdsQuery<'a>,
}

#[derive(Serialize)]
struct IdsQuery<'a> {
    ids: IdValues<'a>,
}

#[derive(Serialize)]
struct IdValues<'a> {
    values: &'a [String],
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<AlertRecord>,
}

/// Elasticsearch-compatible store client
pub struct HttpStore {
    client: reqwest::Client,
    host: String,
    index: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: config.es_host.trim_end_matches('/').to_string(),
            index: config.alerts_index.clone(),
            username: config.es_username.clone(),
            password: config.es_password.clone(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.post(format!("{}/{}/{path}", self.host, self.index));
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }
        request
    }
}

#[async_trait]
impl AlertStore for HttpStore {
    async fn fetch(&self) -> Result<Vec<AlertRecord>, StoreError> {
        let response = self
            .post("_search")
            .timeout(FETCH_TIMEOUT)
            .json(&SearchBody {
                source: true,
                size: FETCH_SIZE,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().to_string()));
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.hits.hits)
    }

    async fn delete(&self, record_ids: &[String]) -> Result<(), StoreError> {
        let response = self
            .post("_delete_by_query")
            .json(&DeleteBody {
                query: IdsQuery {
                    ids: IdValues { values: record_ids },
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().to_string()));
        }

        Ok(())
    }
}
