//! Filter engine: the visible subset of a result set.
//!
//! `visible` is pure and order-preserving. An article passes iff every
//! predicate holds: kind, access, journal substring, author substring,
//! inclusive year range and AI restriction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::article::{Article, Badge};

/// Kind selector: one badge label or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KindFilter {
    #[default]
    All,
    Only(Badge),
}

impl KindFilter {
    fn accepts(&self, article: &Article) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(badge) => article.has_badge(*badge),
        }
    }
}

/// Open-access selector (tri-state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl AccessFilter {
    fn accepts(&self, article: &Article) -> bool {
        match self {
            AccessFilter::All => true,
            AccessFilter::Open => article.is_open_access(),
            AccessFilter::Closed => !article.is_open_access(),
        }
    }
}

/// Observed year extremes of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSpan {
    pub min: i32,
    pub max: i32,
}

impl YearSpan {
    /// `None` for an empty result set.
    pub fn observed(articles: &[Article]) -> Option<Self> {
        let min = articles.iter().map(|a| a.year).min()?;
        let max = articles.iter().map(|a| a.year).max()?;
        Some(Self { min, max })
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

/// Primitive filter criteria owned by the results view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub kind: KindFilter,
    pub access: AccessFilter,
    pub journal: String,
    pub author: String,
    /// Unset means "observed minimum of the current result set"
    pub year_min: Option<i32>,
    /// Unset means "observed maximum of the current result set"
    pub year_max: Option<i32>,
    /// Empty means unrestricted
    pub ai_ids: BTreeSet<u64>,
}

impl FilterCriteria {
    /// Effective inclusive year bounds for this result set.
    pub fn effective_years(&self, articles: &[Article]) -> Option<YearSpan> {
        let observed = YearSpan::observed(articles);
        match (self.year_min, self.year_max, observed) {
            (None, None, None) => None,
            (min, max, observed) => Some(YearSpan {
                min: min.or(observed.map(|o| o.min)).unwrap_or(i32::MIN),
                max: max.or(observed.map(|o| o.max)).unwrap_or(i32::MAX),
            }),
        }
    }

    /// True when no predicate restricts anything.
    pub fn is_default(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// Reset year bounds so they track the current result set again.
    pub fn reset_years(&mut self) {
        self.year_min = None;
        self.year_max = None;
    }

    fn accepts(&self, article: &Article, years: Option<YearSpan>) -> bool {
        self.kind.accepts(article)
            && self.access.accepts(article)
            && contains_ci(&article.journal, &self.journal)
            && contains_ci(&article.joined_authors(), &self.author)
            && years.map_or(true, |span| span.contains(article.year))
            && (self.ai_ids.is_empty() || self.ai_ids.contains(&article.id))
    }
}

/// Compute the visible subset, preserving input order.
pub fn visible<'a>(articles: &'a [Article], criteria: &FilterCriteria) -> Vec<&'a Article> {
    let years = criteria.effective_years(articles);
    articles
        .iter()
        .filter(|article| criteria.accepts(article, years))
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::fixtures::article;

    fn sample() -> Vec<Article> {
        let mut a = article(1, 2018, vec![Badge::Review, Badge::OpenAccess]);
        a.journal = "Journal of Motor Behavior".to_string();
        let mut b = article(2, 2020, vec![Badge::Article]);
        b.authors = vec!["Carla Mendes".to_string()];
        let c = article(3, 2023, vec![Badge::Essay, Badge::OpenAccess]);
        vec![a, b, c]
    }

    fn ids(list: Vec<&Article>) -> Vec<u64> {
        list.into_iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_default_criteria_returns_everything_in_order() {
        let articles = sample();
        assert_eq!(ids(visible(&articles, &FilterCriteria::default())), vec![1, 2, 3]);
    }

    #[test]
    fn test_year_defaults_to_observed_extremes() {
        let articles = sample();
        let span = FilterCriteria::default().effective_years(&articles).unwrap();
        assert_eq!(span, YearSpan { min: 2018, max: 2023 });
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        let articles = sample();
        let criteria = FilterCriteria {
            year_min: Some(2020),
            year_max: Some(2023),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &criteria)), vec![2, 3]);

        let only_max = FilterCriteria {
            year_max: Some(2019),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &only_max)), vec![1]);
    }

    #[test]
    fn test_kind_and_access() {
        let articles = sample();
        let essays = FilterCriteria {
            kind: KindFilter::Only(Badge::Essay),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &essays)), vec![3]);

        let open = FilterCriteria {
            access: AccessFilter::Open,
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &open)), vec![1, 3]);

        let closed = FilterCriteria {
            access: AccessFilter::Closed,
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &closed)), vec![2]);
    }

    #[test]
    fn test_journal_and_author_substrings_case_insensitive() {
        let articles = sample();
        let journal = FilterCriteria {
            journal: "MOTOR".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &journal)), vec![1]);

        let author = FilterCriteria {
            author: "carla".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &author)), vec![2]);

        let blank = FilterCriteria {
            author: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &blank)), vec![1, 2, 3]);
    }

    #[test]
    fn test_author_matches_across_joined_names() {
        let articles = sample();
        let criteria = FilterCriteria {
            author: "souza bruno".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &criteria)), vec![1, 3]);
    }

    #[test]
    fn test_ai_restriction() {
        let articles = sample();
        let criteria = FilterCriteria {
            ai_ids: [3, 1].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(ids(visible(&articles, &criteria)), vec![1, 3]);
    }

    #[test]
    fn test_conjunction_is_ordered_subset_and_repeatable() {
        let articles = sample();
        let criteria = FilterCriteria {
            access: AccessFilter::Open,
            year_min: Some(2019),
            ..Default::default()
        };
        let first = ids(visible(&articles, &criteria));
        let second = ids(visible(&articles, &criteria));
        assert_eq!(first, vec![3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_result_set() {
        let criteria = FilterCriteria::default();
        assert!(criteria.effective_years(&[]).is_none());
        assert!(visible(&[], &criteria).is_empty());
    }
}
