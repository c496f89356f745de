//! Curation session: the results view over the state container.
//!
//! Owns the store and one orchestrator of each kind. Filter edits, the saved
//! list and derived views (visible subset, type options, effective years)
//! live here; network-bound work is delegated to the orchestrators.
//! Collections and comments go through a `CollectionStore` on behalf of the
//! configured identity.
//!
//! Lock order is results -> filters -> saved -> synthesis.

use std::sync::Arc;

use chrono::Utc;
use curator_common::citation::{self, CitationFormat};
use curator_common::{
    messages, type_options, visible, Article, ArticleAnswer, Badge, CuratorError, CuratorResult,
    FilterCriteria, QueryHistory, StructuredSummary, SynthesisKind, SynthesisReport,
    SynthesisSize, YearSpan,
};
use tracing::{debug, info};

use crate::article_assistant::ArticleAssistant;
use crate::client::{AssistantClient, SearchClient};
use crate::collections::{
    Collection, CollectionStore, Comment, Identity, MemoryCollectionStore, SavedArticle,
};
use crate::config::Config;
use crate::persist::PersistedState;
use crate::recommend::{RecommendOutcome, RecommendationOrchestrator};
use crate::search::{SearchOutcome, SearchOrchestrator};
use crate::state::{CurationStore, Notice, SavedEntry};
use crate::synthesize::{SynthesisOrchestrator, SynthesisOutcome};

/// Saved reference resolved against the current result set
#[derive(Debug, Clone, PartialEq)]
pub struct SavedView {
    pub article: Article,
    pub note: String,
    pub saved_at: chrono::DateTime<Utc>,
}

/// Read-only snapshot of the recommendation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantStatus {
    pub in_progress: bool,
    pub stage: String,
    pub summary: String,
    pub update_message: Option<String>,
    pub updated_at: Option<String>,
}

pub struct Session {
    store: CurationStore,
    history_cap: usize,
    search: SearchOrchestrator,
    recommend: RecommendationOrchestrator,
    synthesis: SynthesisOrchestrator,
    assistant: ArticleAssistant,
    collections: Arc<dyn CollectionStore>,
    identity: Identity,
}

impl Session {
    pub fn new(
        config: &Config,
        search_client: Arc<dyn SearchClient>,
        assistant_client: Arc<dyn AssistantClient>,
    ) -> Self {
        let store = CurationStore::new(config.search.history_cap);
        let search = SearchOrchestrator::new(
            search_client,
            config.search.clone(),
            store.results(),
            store.filters(),
            store.saved(),
        );
        let recommend = RecommendationOrchestrator::new(
            Arc::clone(&assistant_client),
            &config.assistant,
            store.results(),
            store.filters(),
        );
        let synthesis = SynthesisOrchestrator::new(
            Arc::clone(&assistant_client),
            &config.assistant.language,
            store.synthesis(),
        );
        let assistant = ArticleAssistant::new(assistant_client, &config.assistant.language);

        Self {
            store,
            history_cap: config.search.history_cap,
            search,
            recommend,
            synthesis,
            assistant,
            collections: Arc::new(MemoryCollectionStore::new()),
            identity: config.identity.to_identity(),
        }
    }

    /// Use another collection backend
    pub fn with_collections(mut self, collections: Arc<dyn CollectionStore>) -> Self {
        self.collections = collections;
        self
    }

    pub fn store(&self) -> &CurationStore {
        &self.store
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    pub async fn search(&self, term: &str) -> SearchOutcome {
        self.search.search(term).await
    }

    pub async fn articles(&self) -> Vec<Article> {
        self.store.results().read().await.articles.clone()
    }

    pub async fn article(&self, id: u64) -> Option<Article> {
        self.store.results().read().await.find(id).cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.store.results().read().await.loading
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.store.results().read().await.notice.clone()
    }

    pub async fn history(&self) -> Vec<String> {
        self.store.saved().read().await.history.entries().to_vec()
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Visible subset under the latest committed criteria
    pub async fn visible(&self) -> Vec<Article> {
        let results = self.store.results();
        let results = results.read().await;
        let filters = self.store.filters();
        let filters = filters.read().await;
        visible(&results.articles, &filters.criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.store.filters().read().await.criteria.clone()
    }

    pub async fn edit_filters<F>(&self, edit: F)
    where
        F: FnOnce(&mut FilterCriteria),
    {
        let filters = self.store.filters();
        let mut filters = filters.write().await;
        edit(&mut filters.criteria);
    }

    pub async fn clear_filters(&self) {
        self.store.filters().write().await.clear();
        info!("filters and recommendations cleared");
    }

    pub async fn effective_years(&self) -> Option<YearSpan> {
        let results = self.store.results();
        let results = results.read().await;
        let filters = self.store.filters();
        let filters = filters.read().await;
        filters.criteria.effective_years(&results.articles)
    }

    pub async fn type_options(&self) -> Vec<Badge> {
        type_options(&self.store.results().read().await.articles)
    }

    // ------------------------------------------------------------------
    // Recommendation
    // ------------------------------------------------------------------

    pub async fn recommend(&self, instruction: &str) -> RecommendOutcome {
        self.recommend.recommend(instruction).await
    }

    pub async fn ai_reason(&self, id: u64) -> Option<String> {
        self.store.filters().read().await.ai_reasons.get(&id).cloned()
    }

    pub async fn assistant_status(&self) -> AssistantStatus {
        let filters = self.store.filters();
        let filters = filters.read().await;
        AssistantStatus {
            in_progress: filters.in_progress,
            stage: filters.stage_label().to_string(),
            summary: filters.ai_summary.clone(),
            update_message: filters.update_message.clone(),
            updated_at: filters.updated_at.map(|t| t.format("%H:%M:%S").to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Saved list
    // ------------------------------------------------------------------

    /// Save an article of the current result set. Saving twice is a no-op.
    pub async fn save(&self, id: u64) -> CuratorResult<bool> {
        let results = self.store.results();
        let results = results.read().await;
        let article = results
            .find(id)
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;

        let saved = self.store.saved();
        let mut saved = saved.write().await;
        if saved
            .entries
            .iter()
            .any(|e| e.refers_to(article, results.generation))
        {
            return Ok(false);
        }
        let entry = SavedEntry::new(article, results.generation);
        info!(id, key = %entry.article_key, "{}", messages::ARTICLE_SAVED);
        saved.entries.insert(0, entry);
        Ok(true)
    }

    /// Remove the saved reference to article `id` of the current result set
    pub async fn remove(&self, id: u64) -> bool {
        let results = self.store.results();
        let results = results.read().await;
        let Some(article) = results.find(id) else {
            return false;
        };

        let saved = self.store.saved();
        let mut saved = saved.write().await;
        let before = saved.entries.len();
        saved
            .entries
            .retain(|e| !e.refers_to(article, results.generation));
        let removed = saved.entries.len() != before;
        if removed {
            info!(id, "{}", messages::ARTICLE_REMOVED);
        }
        removed
    }

    pub async fn update_note(&self, id: u64, note: &str) -> CuratorResult<()> {
        let results = self.store.results();
        let results = results.read().await;
        let saved = self.store.saved();
        let mut saved = saved.write().await;
        let generation = results.generation;
        let entry = match results.find(id) {
            Some(article) => saved
                .entries
                .iter_mut()
                .find(|e| e.refers_to(article, generation)),
            None => None,
        }
        .ok_or_else(|| CuratorError::NotFound(format!("saved article {}", id)))?;
        entry.note = note.to_string();
        Ok(())
    }

    /// Saved references that still resolve; the rest are left out silently
    pub async fn saved_articles(&self) -> Vec<SavedView> {
        let results = self.store.results();
        let results = results.read().await;
        let saved = self.store.saved();
        let saved = saved.read().await;
        saved
            .entries
            .iter()
            .filter_map(|entry| {
                results.resolve(entry).map(|article| SavedView {
                    article: article.clone(),
                    note: entry.note.clone(),
                    saved_at: entry.saved_at,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Synthesis and per-article assistant
    // ------------------------------------------------------------------

    /// Synthesize over the resolvable saved articles
    pub async fn synthesize_saved(&self, kind: SynthesisKind, size: SynthesisSize) -> SynthesisOutcome {
        let articles: Vec<Article> = self
            .saved_articles()
            .await
            .into_iter()
            .map(|view| view.article)
            .collect();
        self.synthesis.synthesize(&articles, kind, size).await
    }

    pub async fn synthesis_report(&self) -> Option<SynthesisReport> {
        self.store.synthesis().read().await.report.clone()
    }

    pub async fn ask(&self, id: u64, question: &str) -> CuratorResult<Option<ArticleAnswer>> {
        let article = self
            .article(id)
            .await
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;
        Ok(self.assistant.ask(&article, question).await)
    }

    pub async fn quick_summary(&self, id: u64) -> CuratorResult<StructuredSummary> {
        let article = self
            .article(id)
            .await
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;
        Ok(self.assistant.quick_summary(&article).await)
    }

    // ------------------------------------------------------------------
    // Collections and comments
    // ------------------------------------------------------------------

    pub async fn collections(&self) -> CuratorResult<Vec<Collection>> {
        self.collections.list_collections(&self.identity).await
    }

    pub async fn create_collection(&self, name: &str) -> CuratorResult<Collection> {
        self.collections
            .create_collection(&self.identity, name, None, false)
            .await
    }

    /// Caller's collection by name, ignoring case
    async fn collection_named(&self, name: &str) -> CuratorResult<Collection> {
        let wanted = name.trim().to_lowercase();
        self.collections()
            .await?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .ok_or_else(|| CuratorError::NotFound(format!("collection {}", name.trim())))
    }

    /// Copy article `id` of the current result set into a collection
    pub async fn collect(&self, id: u64, collection: &str) -> CuratorResult<SavedArticle> {
        let target = self.collection_named(collection).await?;
        let article = self
            .article(id)
            .await
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;
        self.collections
            .save_article(&self.identity, target.id, &article)
            .await
    }

    pub async fn collection_articles(&self, collection: &str) -> CuratorResult<Vec<SavedArticle>> {
        let target = self.collection_named(collection).await?;
        self.collections.list_saved(&self.identity, target.id).await
    }

    pub async fn comment(&self, id: u64, text: &str) -> CuratorResult<Comment> {
        let article = self
            .article(id)
            .await
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;
        if text.trim().is_empty() {
            return Err(CuratorError::Validation("comment is empty".to_string()));
        }
        self.collections
            .add_comment(&self.identity, &article.durable_key(), text.trim(), None)
            .await
    }

    pub async fn comments(&self, id: u64) -> CuratorResult<Vec<Comment>> {
        let article = self
            .article(id)
            .await
            .ok_or_else(|| CuratorError::NotFound(format!("article {}", id)))?;
        self.collections.comments_for(&article.durable_key()).await
    }

    // ------------------------------------------------------------------
    // Export and persistence
    // ------------------------------------------------------------------

    pub async fn export_visible(&self, format: CitationFormat) -> String {
        let articles = self.visible().await;
        let refs: Vec<&Article> = articles.iter().collect();
        citation::export(&refs, format)
    }

    /// History and durable saved entries; positional ones die with the session
    pub async fn persisted(&self) -> PersistedState {
        let saved = self.store.saved();
        let saved = saved.read().await;
        PersistedState {
            history: saved.history.entries().to_vec(),
            saved: saved
                .entries
                .iter()
                .filter(|e| e.is_durable())
                .cloned()
                .collect(),
        }
    }

    pub async fn restore(&self, state: PersistedState) {
        let saved = self.store.saved();
        let mut saved = saved.write().await;
        saved.history = QueryHistory::from_entries(state.history, self.history_cap);
        saved.entries = state.saved.into_iter().filter(SavedEntry::is_durable).collect();
        debug!(
            history = saved.history.len(),
            saved = saved.entries.len(),
            "session state restored"
        );
    }
}
