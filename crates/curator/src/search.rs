//! Search orchestrator.
//!
//! Clears the current result set as soon as a search starts, issues the
//! provider query, and commits the normalized result set together with the
//! history update when the response lands. Each invocation takes a
//! generation token; a response whose token has been superseded is dropped.
//!
//! A commit (applied or failed) re-seeds the filter slice and drops saved
//! entries pinned to older result sets inside the same critical section, so
//! no reader sees the new articles under the old criteria.

use std::sync::Arc;

use curator_common::{messages, Normalizer};
use tracing::{debug, info, warn};

use crate::client::{SearchClient, SearchRequest};
use crate::config::SearchConfig;
use crate::state::{FilterState, Notice, RequestTokens, ResultsState, SavedState, Shared};

/// How one `search` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank term, nothing issued
    Skipped,
    /// New result set committed
    Applied { count: usize },
    /// Request failed; result set left empty
    Failed,
    /// A newer search superseded this one
    Discarded,
}

pub struct SearchOrchestrator {
    client: Arc<dyn SearchClient>,
    config: SearchConfig,
    results: Shared<ResultsState>,
    filters: Shared<FilterState>,
    /// History lives beside the saved list
    saved: Shared<SavedState>,
    tokens: RequestTokens,
}

impl SearchOrchestrator {
    pub fn new(
        client: Arc<dyn SearchClient>,
        config: SearchConfig,
        results: Shared<ResultsState>,
        filters: Shared<FilterState>,
        saved: Shared<SavedState>,
    ) -> Self {
        Self {
            client,
            config,
            results,
            filters,
            saved,
            tokens: RequestTokens::new(),
        }
    }

    pub async fn search(&self, term: &str) -> SearchOutcome {
        let term = term.trim();
        if term.is_empty() {
            return SearchOutcome::Skipped;
        }

        let token = self.tokens.issue();
        {
            let mut results = self.results.write().await;
            results.query = term.to_string();
            results.articles.clear();
            results.loading = true;
            results.notice = None;
        }
        info!(token, "search issued: {}", term);

        let request = SearchRequest::first_page(term, &self.config);
        let response = self.client.search(&request).await;

        let mut results = self.results.write().await;
        if !self.tokens.is_latest(token) {
            debug!(token, latest = self.tokens.latest(), "stale search response dropped");
            return SearchOutcome::Discarded;
        }

        let mut filters = self.filters.write().await;
        let mut saved = self.saved.write().await;

        results.loading = false;
        results.generation += 1;
        filters.reseed();
        let dropped = saved.drop_pinned_before(results.generation);
        debug!(token, dropped, "filters re-seeded for new result set");

        match response {
            Ok(items) => {
                let articles = Normalizer::for_today().normalize_results(&items);
                let count = articles.len();
                results.articles = articles;
                results.notice = Some(Notice::info(messages::search_succeeded(count)));
                saved.history.push(term);
                info!(token, count, "search applied");
                SearchOutcome::Applied { count }
            }
            Err(e) => {
                warn!(token, "search failed: {}", e);
                results.articles.clear();
                results.notice = Some(Notice::error(messages::SEARCH_FAILED));
                SearchOutcome::Failed
            }
        }
    }
}
