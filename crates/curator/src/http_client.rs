//! reqwest implementation of the search and assistant collaborators.

use async_trait::async_trait;
use curator_common::{CuratorError, CuratorResult};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use crate::client::{
    AskRequest, AssistantClient, QuickSummaryRequest, RecommendRequest, SearchClient,
    SearchRequest, SynthesisRequest,
};
use crate::config::ServiceConfig;

/// Endpoints, relative to the configured base URL
pub mod endpoint {
    pub const SEARCH: &str = "/search/articles";
    pub const RECOMMEND: &str = "/llm/recommend-results";
    pub const SYNTHESIZE: &str = "/llm/synthesize";
    pub const ASK: &str = "/llm/ask-article";
    pub const QUICK_SUMMARY: &str = "/llm/quick-summary";
}

/// JSON-over-HTTP client for the curation backend
pub struct HttpClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ServiceConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Self {
            http_client: builder.build().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> CuratorResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CuratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("POST {} -> {} in {:?}", path, status, start.elapsed());
            return Err(CuratorError::Status(status.as_u16()));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| CuratorError::Decode(e.to_string()))?;
        debug!("POST {} -> {} in {:?}", path, status, start.elapsed());
        Ok(value)
    }
}

#[async_trait]
impl SearchClient for HttpClient {
    async fn search(&self, request: &SearchRequest) -> CuratorResult<Vec<Value>> {
        let value = self.post_json(endpoint::SEARCH, request).await?;
        Ok(value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssistantClient for HttpClient {
    async fn recommend(&self, request: &RecommendRequest) -> CuratorResult<Value> {
        self.post_json(endpoint::RECOMMEND, request).await
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> CuratorResult<Value> {
        self.post_json(endpoint::SYNTHESIZE, request).await
    }

    async fn ask(&self, request: &AskRequest) -> CuratorResult<Value> {
        self.post_json(endpoint::ASK, request).await
    }

    async fn quick_summary(&self, request: &QuickSummaryRequest) -> CuratorResult<Value> {
        self.post_json(endpoint::QUICK_SUMMARY, request).await
    }
}
