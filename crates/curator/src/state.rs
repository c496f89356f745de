//! Curation state: one owned container split into independently locked slices.
//!
//! Orchestrators are handed only the slices they write. Every mutation that
//! follows a network round-trip is applied under a single write lock, so a
//! reader never sees a half-applied response.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use curator_common::{Article, FilterCriteria, QueryHistory, SynthesisReport};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub type Shared<T> = Arc<RwLock<T>>;

// ============================================================================
// Request-generation tokens
// ============================================================================

/// Monotonic request counter for one orchestrator kind.
/// A response is applied only when its token is still the latest issued.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: AtomicU64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token, superseding every earlier one
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Slices
// ============================================================================

/// User-facing notice attached to the last search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Current result set, owned by the search orchestrator
#[derive(Debug, Default)]
pub struct ResultsState {
    pub query: String,
    pub articles: Vec<Article>,
    pub loading: bool,
    /// Bumped every time a new result set is committed
    pub generation: u64,
    pub notice: Option<Notice>,
}

impl ResultsState {
    pub fn find(&self, id: u64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Article a saved entry points at, if it is part of this result set
    pub fn resolve(&self, entry: &SavedEntry) -> Option<&Article> {
        self.articles
            .iter()
            .find(|a| entry.refers_to(a, self.generation))
    }
}

/// Recommendation progress stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendStage {
    Preparing,
    Querying,
    Applying,
}

impl RecommendStage {
    pub fn label(&self) -> &'static str {
        use curator_common::messages;
        match self {
            RecommendStage::Preparing => messages::STAGE_PREPARING,
            RecommendStage::Querying => messages::STAGE_QUERYING,
            RecommendStage::Applying => messages::STAGE_APPLYING,
        }
    }
}

/// Filter criteria plus everything the recommendation pass writes
#[derive(Debug, Default)]
pub struct FilterState {
    pub criteria: FilterCriteria,
    pub ai_reasons: BTreeMap<u64, String>,
    pub ai_summary: String,
    pub in_progress: bool,
    pub stage: Option<RecommendStage>,
    pub update_message: Option<String>,
    pub updated_at: Option<DateTime<Local>>,
}

impl FilterState {
    /// Stage label to show while in progress
    pub fn stage_label(&self) -> &'static str {
        self.stage
            .map(|s| s.label())
            .unwrap_or(curator_common::messages::STAGE_IDLE)
    }

    /// Drop everything tied to the previous result set's identifiers
    pub fn reseed(&mut self) {
        self.criteria.reset_years();
        self.criteria.ai_ids.clear();
        self.ai_reasons.clear();
        self.ai_summary.clear();
    }

    /// Explicit "clear" action
    pub fn clear(&mut self) {
        self.criteria = FilterCriteria::default();
        self.ai_reasons.clear();
        self.ai_summary.clear();
        self.update_message = Some(curator_common::messages::FILTERS_CLEARED.to_string());
        self.updated_at = Some(Local::now());
    }
}

/// Saved reference, keyed by `Article::durable_key`.
///
/// Articles with neither DOI nor URL only have a positional key; such an
/// entry is pinned to the result set it was saved from and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub article_key: String,
    /// Results generation for positional keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_to: Option<u64>,
    #[serde(default)]
    pub note: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedEntry {
    pub fn new(article: &Article, generation: u64) -> Self {
        Self {
            article_key: article.durable_key(),
            pinned_to: (!article.has_stable_key()).then_some(generation),
            note: String::new(),
            saved_at: Utc::now(),
        }
    }

    /// Whether this entry refers to `article` of the result set `generation`
    pub fn refers_to(&self, article: &Article, generation: u64) -> bool {
        self.pinned_to.map_or(true, |g| g == generation) && self.article_key == article.durable_key()
    }

    pub fn is_durable(&self) -> bool {
        self.pinned_to.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SavedState {
    pub entries: Vec<SavedEntry>,
    pub history: QueryHistory,
}

impl SavedState {
    /// Positional entries of older result sets can never resolve again
    pub fn drop_pinned_before(&mut self, generation: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| e.pinned_to.map_or(true, |g| g >= generation));
        before - self.entries.len()
    }
}

#[derive(Debug, Default)]
pub struct SynthesisState {
    pub report: Option<SynthesisReport>,
    pub running: bool,
}

// ============================================================================
// Store
// ============================================================================

/// Owned state container; hands out per-slice handles
#[derive(Clone, Default)]
pub struct CurationStore {
    results: Shared<ResultsState>,
    filters: Shared<FilterState>,
    saved: Shared<SavedState>,
    synthesis: Shared<SynthesisState>,
}

impl CurationStore {
    pub fn new(history_cap: usize) -> Self {
        Self {
            saved: Arc::new(RwLock::new(SavedState {
                entries: Vec::new(),
                history: QueryHistory::with_cap(history_cap),
            })),
            ..Self::default()
        }
    }

    pub fn results(&self) -> Shared<ResultsState> {
        Arc::clone(&self.results)
    }

    pub fn filters(&self) -> Shared<FilterState> {
        Arc::clone(&self.filters)
    }

    pub fn saved(&self) -> Shared<SavedState> {
        Arc::clone(&self.saved)
    }

    pub fn synthesis(&self) -> Shared<SynthesisState> {
        Arc::clone(&self.synthesis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_common::{AccessFilter, KindFilter};

    #[test]
    fn test_tokens_are_monotonic() {
        let tokens = RequestTokens::new();
        let first = tokens.issue();
        let second = tokens.issue();
        assert!(second > first);
        assert!(!tokens.is_latest(first));
        assert!(tokens.is_latest(second));
    }

    #[test]
    fn test_reseed_keeps_user_text_filters() {
        let mut state = FilterState::default();
        state.criteria.journal = "pediatria".into();
        state.criteria.year_min = Some(2019);
        state.criteria.ai_ids.insert(3);
        state.ai_reasons.insert(3, "ok".into());
        state.ai_summary = "resumo".into();

        state.reseed();
        assert_eq!(state.criteria.journal, "pediatria");
        assert_eq!(state.criteria.year_min, None);
        assert!(state.criteria.ai_ids.is_empty());
        assert!(state.ai_reasons.is_empty());
        assert!(state.ai_summary.is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = FilterState::default();
        state.criteria.kind = KindFilter::Only(curator_common::Badge::Review);
        state.criteria.access = AccessFilter::Closed;
        state.criteria.ai_ids.insert(1);
        state.ai_summary = "x".into();

        state.clear();
        assert!(state.criteria.is_default());
        assert!(state.ai_summary.is_empty());
        assert_eq!(
            state.update_message.as_deref(),
            Some(curator_common::messages::FILTERS_CLEARED)
        );
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn test_store_applies_history_cap() {
        let store = CurationStore::new(3);
        let saved = store.saved();
        let saved = saved.try_read().unwrap();
        assert_eq!(saved.history.cap(), 3);
    }

    #[test]
    fn test_stage_label_defaults_to_idle() {
        let mut state = FilterState::default();
        assert_eq!(state.stage_label(), curator_common::messages::STAGE_IDLE);
        state.stage = Some(RecommendStage::Querying);
        assert_eq!(state.stage_label(), curator_common::messages::STAGE_QUERYING);
    }

    fn doi_article(id: u64, doi: &str) -> Article {
        curator_common::normalize(&serde_json::json!({"id": id, "title": "T", "doi": doi}), 0)
    }

    #[test]
    fn test_saved_entry_follows_doi_not_position() {
        let entry = SavedEntry::new(&doi_article(2, "10.1/B"), 1);
        assert_eq!(entry.article_key, "doi:10.1/b");
        assert!(entry.is_durable());

        let mut results = ResultsState {
            articles: vec![doi_article(1, "10.9/x"), doi_article(2, "10.9/y")],
            generation: 2,
            ..Default::default()
        };
        assert!(results.resolve(&entry).is_none());

        results.articles = vec![doi_article(5, "10.1/b")];
        assert_eq!(results.resolve(&entry).map(|a| a.id), Some(5));
    }

    #[test]
    fn test_positional_entry_is_pinned_to_its_result_set() {
        let bare = curator_common::normalize(&serde_json::json!({"title": "Sem DOI"}), 0);
        let entry = SavedEntry::new(&bare, 3);
        assert_eq!(entry.pinned_to, Some(3));
        assert!(!entry.is_durable());

        let mut results = ResultsState {
            articles: vec![bare],
            generation: 3,
            ..Default::default()
        };
        assert!(results.resolve(&entry).is_some());
        results.generation = 4;
        assert!(results.resolve(&entry).is_none());
    }

    #[test]
    fn test_new_result_set_drops_stale_positional_entries() {
        let bare = curator_common::normalize(&serde_json::json!({"title": "Sem DOI"}), 0);
        let mut saved = SavedState {
            entries: vec![SavedEntry::new(&bare, 3), SavedEntry::new(&doi_article(1, "10.1/a"), 3)],
            ..Default::default()
        };
        assert_eq!(saved.drop_pinned_before(3), 0);
        assert_eq!(saved.drop_pinned_before(4), 1);
        assert_eq!(saved.entries.len(), 1);
        assert!(saved.entries[0].is_durable());
    }
}
