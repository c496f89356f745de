//! Recommendation orchestrator.
//!
//! Sends the current result set plus a free-text instruction to the AI
//! service and merges the answer into the filter slice. The whole response
//! (selection, rationale, summary, suggested overrides) is applied under one
//! write lock, or not at all.
//!
//! Stages: preparing context -> querying the model -> applying the selection.
//! The in-progress flag is held for at least `min_progress` from invocation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use curator_common::{messages, LlmArticle, RecommendationResult};
use tracing::{debug, info, warn};

use crate::client::{AssistantClient, RecommendRequest};
use crate::config::AssistantConfig;
use crate::state::{FilterState, RecommendStage, RequestTokens, ResultsState, Shared};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendOutcome {
    /// Blank instruction or empty result set
    Skipped,
    Applied { selected: usize },
    Failed,
    /// Superseded by a newer recommendation or a new result set
    Discarded,
}

pub struct RecommendationOrchestrator {
    client: Arc<dyn AssistantClient>,
    language: String,
    min_progress: Duration,
    context_prep: Duration,
    /// Read-only
    results: Shared<ResultsState>,
    filters: Shared<FilterState>,
    tokens: RequestTokens,
}

impl RecommendationOrchestrator {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        config: &AssistantConfig,
        results: Shared<ResultsState>,
        filters: Shared<FilterState>,
    ) -> Self {
        Self {
            client,
            language: config.language.clone(),
            min_progress: config.min_progress(),
            context_prep: config.context_prep(),
            results,
            filters,
            tokens: RequestTokens::new(),
        }
    }

    pub async fn recommend(&self, instruction: &str) -> RecommendOutcome {
        if instruction.trim().is_empty() {
            return RecommendOutcome::Skipped;
        }

        let (articles, known_ids, generation) = {
            let results = self.results.read().await;
            let articles: Vec<LlmArticle> = results.articles.iter().map(|a| a.to_llm()).collect();
            let ids: BTreeSet<u64> = results.articles.iter().map(|a| a.id).collect();
            (articles, ids, results.generation)
        };
        if articles.is_empty() {
            return RecommendOutcome::Skipped;
        }

        let started = Instant::now();
        let token = self.tokens.issue();
        {
            let mut filters = self.filters.write().await;
            filters.in_progress = true;
            filters.stage = Some(RecommendStage::Preparing);
            filters.update_message = Some(messages::RECOMMEND_STARTED.to_string());
        }
        info!(token, articles = articles.len(), "recommendation issued");

        tokio::time::sleep(self.context_prep).await;
        self.set_stage(token, RecommendStage::Querying).await;

        let request = RecommendRequest {
            instruction: instruction.to_string(),
            language: self.language.clone(),
            articles,
        };
        let response = self.client.recommend(&request).await;

        let outcome = match response {
            Ok(value) => {
                self.set_stage(token, RecommendStage::Applying).await;
                let parsed = RecommendationResult::from_value(&value, Some(&known_ids));
                self.apply(token, generation, parsed).await
            }
            Err(e) => {
                warn!(token, "recommendation failed: {}", e);
                self.fail(token).await
            }
        };

        let elapsed = started.elapsed();
        if elapsed < self.min_progress {
            tokio::time::sleep(self.min_progress - elapsed).await;
        }
        self.release(token).await;
        outcome
    }

    async fn set_stage(&self, token: u64, stage: RecommendStage) {
        let mut filters = self.filters.write().await;
        if self.tokens.is_latest(token) {
            filters.stage = Some(stage);
        }
    }

    async fn apply(&self, token: u64, generation: u64, parsed: RecommendationResult) -> RecommendOutcome {
        // results stay read-locked so no search can commit between check and write
        let results = self.results.read().await;
        let mut filters = self.filters.write().await;
        if !self.tokens.is_latest(token) || results.generation != generation {
            debug!(token, "stale recommendation dropped");
            return RecommendOutcome::Discarded;
        }

        let selected = parsed.recommendations.len();
        filters.criteria.ai_ids = parsed.ids();
        filters.ai_reasons = parsed.reasons();
        filters.ai_summary = parsed.summary_or_default();
        parsed.suggested_filters.apply_to(&mut filters.criteria);
        filters.update_message = Some(if selected == 0 {
            messages::RECOMMEND_NONE_SELECTED.to_string()
        } else {
            messages::recommend_applied(selected)
        });
        info!(token, selected, "recommendation applied");
        RecommendOutcome::Applied { selected }
    }

    async fn fail(&self, token: u64) -> RecommendOutcome {
        let mut filters = self.filters.write().await;
        if !self.tokens.is_latest(token) {
            return RecommendOutcome::Discarded;
        }
        filters.ai_summary = messages::RECOMMEND_FAILED.to_string();
        filters.update_message = Some(messages::RECOMMEND_NOT_APPLIED.to_string());
        RecommendOutcome::Failed
    }

    /// Only the latest request may release the indicator
    async fn release(&self, token: u64) {
        let mut filters = self.filters.write().await;
        if self.tokens.is_latest(token) {
            filters.in_progress = false;
            filters.stage = None;
            filters.updated_at = Some(Local::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{AssistantOp, FakeAssistantClient, FakeReply};
    use crate::state::CurationStore;
    use curator_common::{normalize_results, AccessFilter};
    use serde_json::json;

    fn quick_config() -> AssistantConfig {
        AssistantConfig {
            min_progress_ms: 0,
            context_prep_ms: 0,
            ..Default::default()
        }
    }

    async fn seeded_store() -> CurationStore {
        let store = CurationStore::new(8);
        let results = store.results();
        let mut results = results.write().await;
        results.articles = normalize_results(&[
            json!({"title": "A", "year": 2018}),
            json!({"title": "B", "year": 2021}),
            json!({"title": "C", "year": 2023}),
        ]);
        results.generation = 1;
        drop(results);
        store
    }

    fn orchestrator(client: FakeAssistantClient, store: &CurationStore, config: &AssistantConfig) -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(Arc::new(client), config, store.results(), store.filters())
    }

    #[tokio::test]
    async fn test_blank_instruction_or_empty_results_skip() {
        let store = CurationStore::new(8);
        let rec = orchestrator(FakeAssistantClient::builder().build(), &store, &quick_config());
        assert_eq!(rec.recommend("revisões").await, RecommendOutcome::Skipped);

        let store = seeded_store().await;
        let rec = orchestrator(FakeAssistantClient::builder().build(), &store, &quick_config());
        assert_eq!(rec.recommend("  ").await, RecommendOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_success_applies_selection_and_overrides() {
        let store = seeded_store().await;
        let client = FakeAssistantClient::builder()
            .json(
                AssistantOp::Recommend,
                json!({
                    "recommendations": [{"local_id": 2, "reason": "recente"}, {"local_id": 9, "reason": "fora"}],
                    "suggested_filters": {"open_access_only": true, "journal_contains": 3}
                }),
            )
            .build();
        let rec = orchestrator(client, &store, &quick_config());

        assert_eq!(rec.recommend("recentes").await, RecommendOutcome::Applied { selected: 1 });
        let filters = store.filters();
        let filters = filters.read().await;
        assert_eq!(filters.criteria.ai_ids, [2].into_iter().collect());
        assert_eq!(filters.ai_reasons[&2], "recente");
        assert_eq!(filters.ai_summary, messages::recommend_summary(1));
        assert_eq!(filters.criteria.access, AccessFilter::Open);
        assert_eq!(filters.criteria.journal, "");
        assert!(!filters.in_progress);
        assert!(filters.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_only_unknown_ids_say_nothing_was_selected() {
        let store = seeded_store().await;
        let client = FakeAssistantClient::builder()
            .json(
                AssistantOp::Recommend,
                json!({"recommendations": [{"local_id": 99, "reason": "fora"}]}),
            )
            .build();
        let rec = orchestrator(client, &store, &quick_config());

        assert_eq!(rec.recommend("qualquer").await, RecommendOutcome::Applied { selected: 0 });
        let filters = store.filters();
        let filters = filters.read().await;
        assert!(filters.criteria.ai_ids.is_empty());
        assert_eq!(
            filters.update_message.as_deref(),
            Some(messages::RECOMMEND_NONE_SELECTED)
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_criteria_untouched() {
        let store = seeded_store().await;
        {
            let filters = store.filters();
            let mut filters = filters.write().await;
            filters.criteria.ai_ids.insert(1);
            filters.criteria.author = "souza".into();
        }
        let client = FakeAssistantClient::builder()
            .reply(AssistantOp::Recommend, FakeReply::Status(500))
            .build();
        let rec = orchestrator(client, &store, &quick_config());

        assert_eq!(rec.recommend("qualquer").await, RecommendOutcome::Failed);
        let filters = store.filters();
        let filters = filters.read().await;
        assert_eq!(filters.criteria.ai_ids, [1].into_iter().collect());
        assert_eq!(filters.criteria.author, "souza");
        assert_eq!(filters.ai_summary, messages::RECOMMEND_FAILED);
        assert_eq!(filters.update_message.as_deref(), Some(messages::RECOMMEND_NOT_APPLIED));
    }

    #[tokio::test]
    async fn test_progress_floor_holds_indicator() {
        let store = seeded_store().await;
        let client = FakeAssistantClient::builder()
            .json(AssistantOp::Recommend, json!({"recommendations": []}))
            .build();
        let config = AssistantConfig {
            min_progress_ms: 150,
            context_prep_ms: 0,
            ..Default::default()
        };
        let rec = Arc::new(orchestrator(client, &store, &config));

        let started = Instant::now();
        let task = tokio::spawn({
            let rec = Arc::clone(&rec);
            async move { rec.recommend("x").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        {
            let filters = store.filters();
            let filters = filters.read().await;
            assert!(filters.in_progress);
            assert_eq!(filters.stage, Some(RecommendStage::Applying));
        }
        task.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));
        assert!(!store.filters().read().await.in_progress);
    }

    #[tokio::test]
    async fn test_stale_recommendation_is_dropped() {
        let store = seeded_store().await;
        let client = FakeAssistantClient::builder()
            .recommend_for(
                "lento",
                FakeReply::Json(json!({"recommendations": [{"local_id": 1}]})),
                Duration::from_millis(120),
            )
            .recommend_for(
                "rapido",
                FakeReply::Json(json!({"recommendations": [{"local_id": 3}]})),
                Duration::from_millis(10),
            )
            .build();
        let rec = Arc::new(orchestrator(client, &store, &quick_config()));

        let slow = tokio::spawn({
            let rec = Arc::clone(&rec);
            async move { rec.recommend("lento").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(rec.recommend("rapido").await, RecommendOutcome::Applied { selected: 1 });
        assert_eq!(slow.await.unwrap(), RecommendOutcome::Discarded);

        let filters = store.filters();
        let filters = filters.read().await;
        assert_eq!(filters.criteria.ai_ids, [3].into_iter().collect());
        assert!(!filters.in_progress);
    }

    #[tokio::test]
    async fn test_new_result_set_discards_response() {
        let store = seeded_store().await;
        let client = FakeAssistantClient::builder()
            .json(AssistantOp::Recommend, json!({"recommendations": [{"local_id": 1}]}))
            .delay(AssistantOp::Recommend, Duration::from_millis(80))
            .build();
        let rec = Arc::new(orchestrator(client, &store, &quick_config()));

        let task = tokio::spawn({
            let rec = Arc::clone(&rec);
            async move { rec.recommend("x").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.results().write().await.generation += 1;

        assert_eq!(task.await.unwrap(), RecommendOutcome::Discarded);
        assert!(store.filters().read().await.criteria.ai_ids.is_empty());
    }
}
