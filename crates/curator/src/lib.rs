//! Curator - search-result curation for academic articles.
//!
//! Searches federated sources through a backend service, keeps the result set
//! and filter criteria in an owned state container, and merges AI
//! recommendations, syntheses and per-article answers into it.

pub mod article_assistant;
pub mod client;
pub mod collections;
pub mod config;
pub mod fake;
pub mod http_client;
pub mod persist;
pub mod recommend;
pub mod repl;
pub mod search;
pub mod session;
pub mod state;
pub mod synthesize;

pub use article_assistant::ArticleAssistant;
pub use client::{AssistantClient, SearchClient};
pub use collections::{CollectionStore, Identity, MemoryCollectionStore};
pub use config::Config;
pub use http_client::HttpClient;
pub use persist::{PersistedState, StateFile};
pub use recommend::{RecommendOutcome, RecommendationOrchestrator};
pub use search::{SearchOrchestrator, SearchOutcome};
pub use session::Session;
pub use state::CurationStore;
pub use synthesize::{SynthesisOrchestrator, SynthesisOutcome};

pub use curator_common::VERSION;
