//! Per-article AI responses: structured quick summary and question answering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::article::Article;
use crate::messages;

/// Whether a response came from the AI service or from the local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOrigin {
    Generated,
    Fallback,
}

/// Five-part structured summary of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(rename = "objetivo")]
    pub objective: String,
    #[serde(rename = "metodologia")]
    pub methodology: String,
    #[serde(rename = "principais_achados")]
    pub findings: String,
    #[serde(rename = "limitacoes")]
    pub limitations: String,
    #[serde(rename = "implicacoes_praticas")]
    pub implications: String,
    pub origin: AnswerOrigin,
}

impl StructuredSummary {
    /// Read a service response; missing sections become empty strings.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        Self {
            objective: field("objetivo"),
            methodology: field("metodologia"),
            findings: field("principais_achados"),
            limitations: field("limitacoes"),
            implications: field("implicacoes_praticas"),
            origin: AnswerOrigin::Generated,
        }
    }

    /// Local summary assembled from the canonical article.
    pub fn fallback(article: &Article) -> Self {
        let findings = if article.abstract_text.is_empty() {
            article.short_abstract.clone()
        } else {
            article.abstract_text.clone()
        };
        Self {
            objective: format!("Sintetizar rapidamente o artigo: {}.", article.title),
            methodology: article.methodology.clone(),
            findings,
            limitations: article.limitations.join(" "),
            implications: messages::SUMMARY_FALLBACK_IMPLICATIONS.to_string(),
            origin: AnswerOrigin::Fallback,
        }
    }

    /// Plain-text rendering used for clipboard/export.
    pub fn to_plain_text(&self) -> String {
        format!(
            "Objetivo: {}\nMetodologia: {}\nAchados: {}\nLimitacoes: {}\nImplicacoes: {}",
            self.objective, self.methodology, self.findings, self.limitations, self.implications
        )
    }
}

/// Answer to a free-text question about one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAnswer {
    pub answer: String,
    pub citation: String,
    pub origin: AnswerOrigin,
}

impl ArticleAnswer {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        Self {
            answer: field("answer"),
            citation: field("citation"),
            origin: AnswerOrigin::Generated,
        }
    }

    pub fn fallback() -> Self {
        Self {
            answer: messages::ANSWER_FAILED.to_string(),
            citation: String::new(),
            origin: AnswerOrigin::Fallback,
        }
    }

    /// Answer followed by its citation, separated by a blank line.
    pub fn display_text(&self) -> String {
        if self.citation.is_empty() {
            self.answer.clone()
        } else {
            format!("{}\n\n{}", self.answer, self.citation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::fixtures::article;
    use crate::article::Badge;
    use serde_json::json;

    #[test]
    fn test_summary_from_partial_response() {
        let summary = StructuredSummary::from_value(&json!({
            "objetivo": " Avaliar ",
            "principais_achados": "Melhora motora"
        }));
        assert_eq!(summary.objective, "Avaliar");
        assert_eq!(summary.findings, "Melhora motora");
        assert_eq!(summary.methodology, "");
        assert_eq!(summary.origin, AnswerOrigin::Generated);
    }

    #[test]
    fn test_summary_fallback_uses_article_fields() {
        let a = article(1, 2020, vec![Badge::Article]);
        let summary = StructuredSummary::fallback(&a);
        assert_eq!(summary.objective, "Sintetizar rapidamente o artigo: Artigo 1.");
        assert_eq!(summary.findings, "Resumo completo");
        assert_eq!(summary.limitations, "Limitação");
        assert_eq!(summary.origin, AnswerOrigin::Fallback);
        assert!(summary.to_plain_text().contains("Implicacoes: Não foi possível"));
    }

    #[test]
    fn test_answer_display() {
        let answer = ArticleAnswer::from_value(&json!({"answer": "Sim.", "citation": "(Souza, 2020)"}));
        assert_eq!(answer.display_text(), "Sim.\n\n(Souza, 2020)");
        assert_eq!(ArticleAnswer::fallback().display_text(), messages::ANSWER_FAILED);
    }
}
