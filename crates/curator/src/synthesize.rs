//! Synthesis orchestrator: cross-article synthesis over the saved articles.

use std::sync::Arc;

use curator_common::synthesis::MIN_SYNTHESIS_ARTICLES;
use curator_common::{Article, SynthesisKind, SynthesisOrigin, SynthesisReport, SynthesisSize};
use tracing::{debug, info, warn};

use crate::client::{AssistantClient, SynthesisRequest};
use crate::state::{RequestTokens, Shared, SynthesisState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Fewer than two articles
    Skipped,
    Generated,
    Fallback,
    Discarded,
}

pub struct SynthesisOrchestrator {
    client: Arc<dyn AssistantClient>,
    language: String,
    synthesis: Shared<SynthesisState>,
    tokens: RequestTokens,
}

impl SynthesisOrchestrator {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        language: &str,
        synthesis: Shared<SynthesisState>,
    ) -> Self {
        Self {
            client,
            language: language.to_string(),
            synthesis,
            tokens: RequestTokens::new(),
        }
    }

    pub async fn synthesize(
        &self,
        articles: &[Article],
        kind: SynthesisKind,
        size: SynthesisSize,
    ) -> SynthesisOutcome {
        if articles.len() < MIN_SYNTHESIS_ARTICLES {
            debug!(count = articles.len(), "synthesis needs at least two articles");
            return SynthesisOutcome::Skipped;
        }

        let token = self.tokens.issue();
        self.synthesis.write().await.running = true;
        info!(token, count = articles.len(), kind = kind.label(), "synthesis issued");

        let request = SynthesisRequest {
            articles: articles.iter().map(Article::to_llm).collect(),
            synthesis_type: kind,
            size,
            language: self.language.clone(),
        };

        let report = match self.client.synthesize(&request).await {
            Ok(value) => serde_json::from_value::<SynthesisReport>(value).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let mut state = self.synthesis.write().await;
        if !self.tokens.is_latest(token) {
            debug!(token, "stale synthesis response dropped");
            return SynthesisOutcome::Discarded;
        }
        state.running = false;

        match report {
            Ok(mut report) => {
                report.origin = SynthesisOrigin::Generated;
                state.report = Some(report);
                info!(token, "synthesis applied");
                SynthesisOutcome::Generated
            }
            Err(e) => {
                warn!(token, "synthesis unavailable, using fallback template: {}", e);
                state.report = Some(SynthesisReport::fallback());
                SynthesisOutcome::Fallback
            }
        }
    }
}
