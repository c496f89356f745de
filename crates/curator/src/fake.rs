//! Fake collaborators for deterministic testing.
//!
//! Provides pre-configured responses without any network access, an optional
//! per-call delay (to exercise in-flight races), and call recording for
//! assertions.
//!
//! ```rust,ignore
//! let search = FakeSearchClient::builder()
//!     .results("psicomotricidade", vec![json!({"title": "A"})])
//!     .delay("slow", Duration::from_millis(50))
//!     .build();
//! ```

use async_trait::async_trait;
use curator_common::{CuratorError, CuratorResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::client::{
    AskRequest, AssistantClient, QuickSummaryRequest, RecommendRequest, SearchClient,
    SearchRequest, SynthesisRequest,
};

/// Pre-configured outcome of one fake call
#[derive(Debug, Clone)]
pub enum FakeReply {
    Json(Value),
    Status(u16),
    Network(String),
}

impl FakeReply {
    fn into_result(self) -> CuratorResult<Value> {
        match self {
            FakeReply::Json(value) => Ok(value),
            FakeReply::Status(code) => Err(CuratorError::Status(code)),
            FakeReply::Network(msg) => Err(CuratorError::Network(msg)),
        }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Fake search
// ============================================================================

pub struct FakeSearchClient {
    /// Map of query -> outcome
    replies: HashMap<String, FakeReply>,
    default_reply: FakeReply,
    delays: HashMap<String, Duration>,
    /// Requests in arrival order
    calls: Arc<Mutex<Vec<SearchRequest>>>,
}

impl FakeSearchClient {
    pub fn builder() -> FakeSearchClientBuilder {
        FakeSearchClientBuilder::new()
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        locked(&self.calls).clone()
    }
}

#[async_trait]
impl SearchClient for FakeSearchClient {
    async fn search(&self, request: &SearchRequest) -> CuratorResult<Vec<Value>> {
        locked(&self.calls).push(request.clone());

        if let Some(delay) = self.delays.get(&request.query) {
            tokio::time::sleep(*delay).await;
        }

        let reply = self
            .replies
            .get(&request.query)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        let value = reply.into_result()?;
        Ok(value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

/// Builder for FakeSearchClient
pub struct FakeSearchClientBuilder {
    replies: HashMap<String, FakeReply>,
    default_reply: FakeReply,
    delays: HashMap<String, Duration>,
}

impl FakeSearchClientBuilder {
    /// Unknown queries return an empty result set
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            default_reply: FakeReply::Json(serde_json::json!({ "results": [] })),
            delays: HashMap::new(),
        }
    }

    pub fn results(mut self, query: &str, items: Vec<Value>) -> Self {
        self.replies.insert(
            query.to_string(),
            FakeReply::Json(serde_json::json!({ "results": items })),
        );
        self
    }

    pub fn reply(mut self, query: &str, reply: FakeReply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }

    pub fn default_reply(mut self, reply: FakeReply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn build(self) -> FakeSearchClient {
        FakeSearchClient {
            replies: self.replies,
            default_reply: self.default_reply,
            delays: self.delays,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for FakeSearchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fake assistant
// ============================================================================

/// Assistant operation, used to key replies and call counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantOp {
    Recommend,
    Synthesize,
    Ask,
    QuickSummary,
}

pub struct FakeAssistantClient {
    replies: HashMap<AssistantOp, FakeReply>,
    delays: HashMap<AssistantOp, Duration>,
    /// Per-instruction recommendation replies, checked before `replies`
    recommend_by_instruction: HashMap<String, FakeReply>,
    recommend_delays: HashMap<String, Duration>,
    call_counts: Arc<Mutex<HashMap<AssistantOp, usize>>>,
    recommend_calls: Arc<Mutex<Vec<RecommendRequest>>>,
    synthesis_calls: Arc<Mutex<Vec<SynthesisRequest>>>,
}

impl FakeAssistantClient {
    pub fn builder() -> FakeAssistantClientBuilder {
        FakeAssistantClientBuilder::new()
    }

    pub fn call_count(&self, op: AssistantOp) -> usize {
        locked(&self.call_counts).get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        locked(&self.call_counts).values().sum()
    }

    pub fn recommend_requests(&self) -> Vec<RecommendRequest> {
        locked(&self.recommend_calls).clone()
    }

    pub fn synthesis_requests(&self) -> Vec<SynthesisRequest> {
        locked(&self.synthesis_calls).clone()
    }

    async fn respond(&self, op: AssistantOp) -> CuratorResult<Value> {
        *locked(&self.call_counts).entry(op).or_insert(0) += 1;

        if let Some(delay) = self.delays.get(&op) {
            tokio::time::sleep(*delay).await;
        }

        self.replies
            .get(&op)
            .cloned()
            .unwrap_or(FakeReply::Status(503))
            .into_result()
    }
}

#[async_trait]
impl AssistantClient for FakeAssistantClient {
    async fn recommend(&self, request: &RecommendRequest) -> CuratorResult<Value> {
        locked(&self.recommend_calls).push(request.clone());

        match self.recommend_by_instruction.get(&request.instruction) {
            Some(reply) => {
                *locked(&self.call_counts)
                    .entry(AssistantOp::Recommend)
                    .or_insert(0) += 1;
                if let Some(delay) = self.recommend_delays.get(&request.instruction) {
                    tokio::time::sleep(*delay).await;
                }
                reply.clone().into_result()
            }
            None => self.respond(AssistantOp::Recommend).await,
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> CuratorResult<Value> {
        locked(&self.synthesis_calls).push(request.clone());
        self.respond(AssistantOp::Synthesize).await
    }

    async fn ask(&self, _request: &AskRequest) -> CuratorResult<Value> {
        self.respond(AssistantOp::Ask).await
    }

    async fn quick_summary(&self, _request: &QuickSummaryRequest) -> CuratorResult<Value> {
        self.respond(AssistantOp::QuickSummary).await
    }
}

/// Builder for FakeAssistantClient. Operations without a configured reply
/// answer HTTP 503.
pub struct FakeAssistantClientBuilder {
    replies: HashMap<AssistantOp, FakeReply>,
    delays: HashMap<AssistantOp, Duration>,
    recommend_by_instruction: HashMap<String, FakeReply>,
    recommend_delays: HashMap<String, Duration>,
}

impl FakeAssistantClientBuilder {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            delays: HashMap::new(),
            recommend_by_instruction: HashMap::new(),
            recommend_delays: HashMap::new(),
        }
    }

    pub fn reply(mut self, op: AssistantOp, reply: FakeReply) -> Self {
        self.replies.insert(op, reply);
        self
    }

    pub fn json(self, op: AssistantOp, value: Value) -> Self {
        self.reply(op, FakeReply::Json(value))
    }

    pub fn delay(mut self, op: AssistantOp, delay: Duration) -> Self {
        self.delays.insert(op, delay);
        self
    }

    pub fn recommend_for(mut self, instruction: &str, reply: FakeReply, delay: Duration) -> Self {
        self.recommend_by_instruction
            .insert(instruction.to_string(), reply);
        self.recommend_delays.insert(instruction.to_string(), delay);
        self
    }

    pub fn build(self) -> FakeAssistantClient {
        FakeAssistantClient {
            replies: self.replies,
            delays: self.delays,
            recommend_by_instruction: self.recommend_by_instruction,
            recommend_delays: self.recommend_delays,
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            recommend_calls: Arc::new(Mutex::new(Vec::new())),
            synthesis_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for FakeAssistantClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
