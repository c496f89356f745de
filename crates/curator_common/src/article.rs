//! Canonical article record and its derived badges.
//!
//! Every downstream component operates on `Article`; raw provider records
//! never travel past the normalizer.

use serde::{Deserialize, Serialize};

/// Derived classification label (kind + access status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "Revisao")]
    Review,
    #[serde(rename = "Ensaio")]
    Essay,
    #[serde(rename = "Artigo")]
    Article,
    #[serde(rename = "Open Access")]
    OpenAccess,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Review => "Revisao",
            Badge::Essay => "Ensaio",
            Badge::Article => "Artigo",
            Badge::OpenAccess => "Open Access",
        }
    }

    /// Parse a badge from its label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "revisao" | "revisão" | "review" => Some(Badge::Review),
            "ensaio" | "essay" => Some(Badge::Essay),
            "artigo" | "article" => Some(Badge::Article),
            "open access" | "open-access" | "oa" => Some(Badge::OpenAccess),
            _ => None,
        }
    }

    /// True for the mutually exclusive kind badges (everything but access).
    pub fn is_kind(&self) -> bool {
        !matches!(self, Badge::OpenAccess)
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Derive the badge set from the provider's paper-type text and access flag.
///
/// Exactly one kind badge is produced; "review" takes priority over "essay",
/// and anything else is a plain article. Open access is appended independently.
pub fn badges_for(paper_type: Option<&str>, open_access: bool) -> Vec<Badge> {
    let kind_text = paper_type.unwrap_or("").to_lowercase();
    let kind = if kind_text.contains("review") {
        Badge::Review
    } else if kind_text.contains("essay") {
        Badge::Essay
    } else {
        Badge::Article
    };

    let mut badges = vec![kind];
    if open_access {
        badges.push(Badge::OpenAccess);
    }
    badges
}

/// Canonical, fully populated article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique within one result set only; not a durable key
    pub id: u64,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub journal: String,
    pub short_abstract: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub methodology: String,
    pub conclusions: Vec<String>,
    pub limitations: Vec<String>,
    pub doi: String,
    pub url: String,
    pub badges: Vec<Badge>,
}

impl Article {
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    pub fn is_open_access(&self) -> bool {
        self.has_badge(Badge::OpenAccess)
    }

    /// True when the article carries a DOI or source URL
    pub fn has_stable_key(&self) -> bool {
        !self.doi.trim().is_empty() || !self.url.trim().is_empty()
    }

    /// Key that survives across searches: DOI, then source URL, then the
    /// result-set-local id as a last resort.
    pub fn durable_key(&self) -> String {
        if !self.doi.trim().is_empty() {
            format!("doi:{}", self.doi.trim().to_lowercase())
        } else if !self.url.trim().is_empty() {
            format!("url:{}", self.url.trim())
        } else {
            format!("local:{}", self.id)
        }
    }

    pub fn joined_authors(&self) -> String {
        self.authors.join(" ")
    }

    /// Projection sent on every AI call.
    pub fn to_llm(&self) -> LlmArticle {
        LlmArticle::from(self)
    }
}

/// Distinct kind badges present in a result set, in first-seen order.
pub fn type_options(articles: &[Article]) -> Vec<Badge> {
    let mut options = Vec::new();
    for badge in articles.iter().flat_map(|a| a.badges.iter()) {
        if badge.is_kind() && !options.contains(badge) {
            options.push(*badge);
        }
    }
    options
}

/// Article projection for the AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmArticle {
    pub local_id: u64,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub journal: String,
    pub doi: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub methodology: String,
    pub limitations: Vec<String>,
    pub conclusions: Vec<String>,
}

impl From<&Article> for LlmArticle {
    fn from(article: &Article) -> Self {
        Self {
            local_id: article.id,
            title: article.title.clone(),
            authors: article.authors.clone(),
            year: article.year,
            journal: article.journal.clone(),
            doi: article.doi.clone(),
            abstract_text: article.abstract_text.clone(),
            methodology: article.methodology.clone(),
            limitations: article.limitations.clone(),
            conclusions: article.conclusions.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn article(id: u64, year: i32, badges: Vec<Badge>) -> Article {
        Article {
            id,
            title: format!("Artigo {}", id),
            authors: vec!["Ana Souza".to_string(), "Bruno Lima".to_string()],
            year,
            journal: "Revista Brasileira de Pesquisa".to_string(),
            short_abstract: "Resumo".to_string(),
            abstract_text: "Resumo completo".to_string(),
            methodology: "Metodologia".to_string(),
            conclusions: vec!["Conclusão".to_string()],
            limitations: vec!["Limitação".to_string()],
            doi: String::new(),
            url: String::new(),
            badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::article;
    use super::*;

    #[test]
    fn test_review_is_exclusive() {
        assert_eq!(badges_for(Some("Systematic REVIEW"), false), vec![Badge::Review]);
        assert_eq!(
            badges_for(Some("review essay"), true),
            vec![Badge::Review, Badge::OpenAccess]
        );
    }

    #[test]
    fn test_essay_and_default_kind() {
        assert_eq!(badges_for(Some("Essay"), false), vec![Badge::Essay]);
        assert_eq!(badges_for(Some("journal-article"), false), vec![Badge::Article]);
        assert_eq!(badges_for(None, false), vec![Badge::Article]);
        assert_eq!(badges_for(None, true), vec![Badge::Article, Badge::OpenAccess]);
    }

    #[test]
    fn test_badge_labels_roundtrip() {
        for badge in [Badge::Review, Badge::Essay, Badge::Article, Badge::OpenAccess] {
            assert_eq!(Badge::from_label(badge.label()), Some(badge));
        }
        assert_eq!(Badge::from_label("Preprint"), None);
    }

    #[test]
    fn test_badge_serializes_as_label() {
        let json = serde_json::to_string(&Badge::OpenAccess).unwrap();
        assert_eq!(json, "\"Open Access\"");
    }

    #[test]
    fn test_type_options_first_seen_order() {
        let articles = vec![
            article(1, 2020, vec![Badge::Essay, Badge::OpenAccess]),
            article(2, 2021, vec![Badge::Article]),
            article(3, 2022, vec![Badge::Essay]),
        ];
        assert_eq!(type_options(&articles), vec![Badge::Essay, Badge::Article]);
    }

    #[test]
    fn test_durable_key_prefers_doi_then_url() {
        let mut a = article(7, 2020, vec![Badge::Article]);
        assert_eq!(a.durable_key(), "local:7");
        assert!(!a.has_stable_key());
        a.url = "https://example.org/paper".to_string();
        assert_eq!(a.durable_key(), "url:https://example.org/paper");
        assert!(a.has_stable_key());
        a.doi = "10.1000/ABC".to_string();
        assert_eq!(a.durable_key(), "doi:10.1000/abc");
    }

    #[test]
    fn test_llm_projection_carries_normalized_fields() {
        let a = article(3, 2019, vec![Badge::Review]);
        let llm = a.to_llm();
        assert_eq!(llm.local_id, 3);
        assert_eq!(llm.methodology, "Metodologia");
        let json = serde_json::to_value(&llm).unwrap();
        assert_eq!(json["abstract"], "Resumo completo");
        assert!(json.get("abstract_text").is_none());
    }
}
