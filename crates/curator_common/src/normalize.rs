//! Raw provider record -> canonical `Article`.
//!
//! Normalization is total: any absent or malformed field degrades to a typed
//! placeholder. The input is an untyped JSON value so that no provider shape
//! can make this stage fail.

use std::collections::HashSet;

use chrono::Datelike;
use serde_json::Value;

use crate::article::{badges_for, Article};
use crate::messages;

/// Maximum characters kept in the short abstract
pub const SHORT_ABSTRACT_CHARS: usize = 240;

/// Normalizer bound to a reference calendar year (used when a record has none).
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    current_year: i32,
}

impl Normalizer {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Normalizer using today's local calendar year.
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().year())
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Convert one raw search-result item. `index` is its position in the result set.
    pub fn normalize(&self, raw: &Value, index: usize) -> Article {
        let abstract_text = text_field(raw, "abstract").unwrap_or_default();

        Article {
            id: numeric_id(raw.get("id")).unwrap_or(index as u64 + 1),
            title: text_field(raw, "title").unwrap_or_else(|| messages::UNTITLED.to_string()),
            authors: author_names(raw.get("authors")),
            year: year_value(raw.get("year")).unwrap_or(self.current_year),
            journal: text_field(raw, "journal")
                .unwrap_or_else(|| messages::JOURNAL_MISSING.to_string()),
            short_abstract: short_abstract(&abstract_text),
            abstract_text: if abstract_text.is_empty() {
                messages::ABSTRACT_MISSING.to_string()
            } else {
                abstract_text
            },
            methodology: messages::METHODOLOGY_PENDING.to_string(),
            conclusions: vec![messages::CONCLUSIONS_PENDING.to_string()],
            limitations: vec![messages::LIMITATIONS_PENDING.to_string()],
            doi: text_field(raw, "doi").unwrap_or_default(),
            url: text_field(raw, "url").unwrap_or_default(),
            badges: badges_for(
                raw.get("paper_type").and_then(Value::as_str),
                raw.get("open_access").and_then(Value::as_bool).unwrap_or(false),
            ),
        }
    }

    /// Normalize a whole result set, keeping identifiers unique inside it.
    ///
    /// A repeated provider id is replaced by the smallest unused positive id.
    pub fn normalize_results(&self, items: &[Value]) -> Vec<Article> {
        let mut articles: Vec<Article> = items
            .iter()
            .enumerate()
            .map(|(idx, raw)| self.normalize(raw, idx))
            .collect();

        let mut seen: HashSet<u64> = HashSet::with_capacity(articles.len());
        let mut duplicates = Vec::new();
        for (pos, article) in articles.iter().enumerate() {
            if !seen.insert(article.id) {
                duplicates.push(pos);
            }
        }

        let mut next_free = 1u64;
        for pos in duplicates {
            while seen.contains(&next_free) {
                next_free += 1;
            }
            articles[pos].id = next_free;
            seen.insert(next_free);
        }

        articles
    }
}

/// Normalize with the local calendar year as the missing-year default.
pub fn normalize(raw: &Value, index: usize) -> Article {
    Normalizer::for_today().normalize(raw, index)
}

/// Normalize a result set with the local calendar year as the missing-year default.
pub fn normalize_results(items: &[Value]) -> Vec<Article> {
    Normalizer::for_today().normalize_results(items)
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn numeric_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn year_value(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn author_names(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn short_abstract(abstract_text: &str) -> String {
    if abstract_text.is_empty() {
        return messages::SHORT_ABSTRACT_MISSING.to_string();
    }
    let mut chars = abstract_text.chars();
    let head: String = chars.by_ref().take(SHORT_ABSTRACT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
