//! Collaborator traits for the search provider and the AI assistant.
//!
//! Production code uses the reqwest clients in `http_client`; tests use the
//! fakes in `fake` with pre-configured responses.

use async_trait::async_trait;
use curator_common::{CuratorResult, LlmArticle, SynthesisKind, SynthesisSize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SearchConfig;

// ============================================================================
// Request shapes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub sources: Vec<String>,
}

/// Federated search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: String,
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// First page, sorted by relevance
    pub fn first_page(query: &str, config: &SearchConfig) -> Self {
        Self {
            query: query.to_string(),
            limit: config.page_size,
            offset: 0,
            sort_by: "relevance".to_string(),
            filters: SearchFilters {
                sources: config.sources.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub instruction: String,
    pub language: String,
    pub articles: Vec<LlmArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub articles: Vec<LlmArticle>,
    pub synthesis_type: SynthesisKind,
    pub size: SynthesisSize,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub article: LlmArticle,
    pub question: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickSummaryRequest {
    pub article: LlmArticle,
    pub language: String,
}

// ============================================================================
// Traits
// ============================================================================

/// Article-search collaborator
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Raw provider records; a response without `results` yields an empty list
    async fn search(&self, request: &SearchRequest) -> CuratorResult<Vec<Value>>;
}

/// AI collaborator. Responses stay loosely typed; callers parse them
/// behind type guards.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn recommend(&self, request: &RecommendRequest) -> CuratorResult<Value>;

    async fn synthesize(&self, request: &SynthesisRequest) -> CuratorResult<Value>;

    async fn ask(&self, request: &AskRequest) -> CuratorResult<Value>;

    async fn quick_summary(&self, request: &QuickSummaryRequest) -> CuratorResult<Value>;
}
