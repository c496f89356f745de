//! Per-article question answering and quick summary.
//!
//! Both calls always resolve to something displayable: a service failure
//! becomes the fallback answer text or a summary built from the article itself.

use std::sync::Arc;

use curator_common::{Article, ArticleAnswer, StructuredSummary};
use tracing::{info, warn};

use crate::client::{AskRequest, AssistantClient, QuickSummaryRequest};

pub struct ArticleAssistant {
    client: Arc<dyn AssistantClient>,
    language: String,
}

impl ArticleAssistant {
    pub fn new(client: Arc<dyn AssistantClient>, language: &str) -> Self {
        Self {
            client,
            language: language.to_string(),
        }
    }

    /// `None` for a blank question
    pub async fn ask(&self, article: &Article, question: &str) -> Option<ArticleAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let request = AskRequest {
            article: article.to_llm(),
            question: question.to_string(),
            language: self.language.clone(),
        };
        let answer = match self.client.ask(&request).await {
            Ok(value) => ArticleAnswer::from_value(&value),
            Err(e) => {
                warn!(article = article.id, "ask-article failed: {}", e);
                ArticleAnswer::fallback()
            }
        };
        info!(article = article.id, origin = ?answer.origin, "article question answered");
        Some(answer)
    }

    pub async fn quick_summary(&self, article: &Article) -> StructuredSummary {
        let request = QuickSummaryRequest {
            article: article.to_llm(),
            language: self.language.clone(),
        };
        match self.client.quick_summary(&request).await {
            Ok(value) => StructuredSummary::from_value(&value),
            Err(e) => {
                warn!(article = article.id, "quick summary failed, summarizing locally: {}", e);
                StructuredSummary::fallback(article)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{AssistantOp, FakeAssistantClient};
    use curator_common::{messages, normalize, AnswerOrigin};
    use serde_json::json;

    fn article() -> Article {
        normalize(&json!({"id": 4, "title": "Psicomotricidade na escola", "abstract": "Estudo."}), 0)
    }

    #[tokio::test]
    async fn test_blank_question_sends_nothing() {
        let client = Arc::new(FakeAssistantClient::builder().build());
        let assistant = ArticleAssistant::new(client.clone(), "pt-BR");
        assert!(assistant.ask(&article(), "  ").await.is_none());
        assert_eq!(client.call_count(AssistantOp::Ask), 0);
    }

    #[tokio::test]
    async fn test_answer_and_fallback() {
        let client = Arc::new(
            FakeAssistantClient::builder()
                .json(AssistantOp::Ask, json!({"answer": "Crianças de 6 anos.", "citation": "(Lima, 2020)"}))
                .build(),
        );
        let assistant = ArticleAssistant::new(client, "pt-BR");
        let answer = assistant.ask(&article(), "Qual a amostra?").await.unwrap();
        assert_eq!(answer.origin, AnswerOrigin::Generated);
        assert_eq!(answer.display_text(), "Crianças de 6 anos.\n\n(Lima, 2020)");

        let offline = ArticleAssistant::new(Arc::new(FakeAssistantClient::builder().build()), "pt-BR");
        let answer = offline.ask(&article(), "Qual a amostra?").await.unwrap();
        assert_eq!(answer.origin, AnswerOrigin::Fallback);
        assert_eq!(answer.answer, messages::ANSWER_FAILED);
    }

    #[tokio::test]
    async fn test_quick_summary_falls_back_to_article() {
        let offline = ArticleAssistant::new(Arc::new(FakeAssistantClient::builder().build()), "pt-BR");
        let summary = offline.quick_summary(&article()).await;
        assert_eq!(summary.origin, AnswerOrigin::Fallback);
        assert_eq!(summary.findings, "Estudo.");
        assert_eq!(summary.implications, messages::SUMMARY_FALLBACK_IMPLICATIONS);
    }
}
