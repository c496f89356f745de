//! Shared types and pure logic for the curation pipeline.
//!
//! Everything in this crate is synchronous and free of I/O: the canonical
//! article shape, the normalizer that produces it, the filter engine that
//! computes the visible subset, and the response models (with their static
//! fallbacks) exchanged with the AI collaborator.

pub mod article;
pub mod citation;
pub mod error;
pub mod filter;
pub mod history;
pub mod messages;
pub mod normalize;
pub mod recommendation;
pub mod summary;
pub mod synthesis;

pub use article::{badges_for, type_options, Article, Badge, LlmArticle};
pub use citation::CitationFormat;
pub use error::{CuratorError, CuratorResult};
pub use filter::{visible, AccessFilter, FilterCriteria, KindFilter, YearSpan};
pub use history::QueryHistory;
pub use normalize::{normalize, normalize_results, Normalizer};
pub use recommendation::{Recommendation, RecommendationResult, SuggestedFilters};
pub use summary::{AnswerOrigin, ArticleAnswer, StructuredSummary};
pub use synthesis::{SynthesisKind, SynthesisOrigin, SynthesisReport, SynthesisSize};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
