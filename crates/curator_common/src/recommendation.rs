//! AI recommendation response model.
//!
//! The service response is loosely typed, so it is parsed field by field
//! behind type guards. Malformed entries and unknown keys are skipped rather
//! than failing the whole response.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{AccessFilter, FilterCriteria};
use crate::messages;

/// One recommended article with the model's rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub local_id: u64,
    pub reason: String,
}

/// Partial filter override proposed by the model. Every field is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_access_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_contains: Option<String>,
}

impl SuggestedFilters {
    /// Parse with per-field type guards; anything that is not an object yields no overrides.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let year = |key: &str| map.get(key).and_then(year_number);
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            year_min: year("year_min"),
            year_max: year("year_max"),
            open_access_only: map.get("open_access_only").and_then(Value::as_bool),
            journal_contains: text("journal_contains"),
            author_contains: text("author_contains"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply present fields on top of existing criteria, leaving the rest untouched.
    pub fn apply_to(&self, criteria: &mut FilterCriteria) {
        if let Some(year) = self.year_min {
            criteria.year_min = Some(year);
        }
        if let Some(year) = self.year_max {
            criteria.year_max = Some(year);
        }
        if let Some(only_open) = self.open_access_only {
            criteria.access = if only_open {
                AccessFilter::Open
            } else {
                AccessFilter::All
            };
        }
        if let Some(journal) = &self.journal_contains {
            criteria.journal = journal.clone();
        }
        if let Some(author) = &self.author_contains {
            criteria.author = author.clone();
        }
    }
}

/// Parsed recommendation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "SuggestedFilters::is_empty")]
    pub suggested_filters: SuggestedFilters,
}

impl RecommendationResult {
    /// Parse a service response. When `known_ids` is given, recommendations
    /// for identifiers outside the submitted result set are dropped.
    pub fn from_value(value: &Value, known_ids: Option<&BTreeSet<u64>>) -> Self {
        let mut seen = BTreeSet::new();
        let recommendations = value
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(parse_recommendation)
                    .filter(|rec| known_ids.map_or(true, |ids| ids.contains(&rec.local_id)))
                    .filter(|rec| seen.insert(rec.local_id))
                    .collect()
            })
            .unwrap_or_default();

        let summary = value
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let suggested_filters = value
            .get("suggested_filters")
            .map(SuggestedFilters::from_value)
            .unwrap_or_default();

        Self {
            recommendations,
            summary,
            suggested_filters,
        }
    }

    pub fn ids(&self) -> BTreeSet<u64> {
        self.recommendations.iter().map(|r| r.local_id).collect()
    }

    pub fn reasons(&self) -> BTreeMap<u64, String> {
        self.recommendations
            .iter()
            .map(|r| (r.local_id, r.reason.clone()))
            .collect()
    }

    /// The service summary, or a count-based sentence when it gave none.
    pub fn summary_or_default(&self) -> String {
        self.summary
            .clone()
            .unwrap_or_else(|| messages::recommend_summary(self.recommendations.len()))
    }
}

/// Any JSON number with no fractional part, so `2020` and `2020.0` both count.
fn year_number(value: &Value) -> Option<i32> {
    if let Some(year) = value.as_i64() {
        return i32::try_from(year).ok();
    }
    let year = value.as_f64()?;
    if year.fract() != 0.0 || year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
        return None;
    }
    Some(year as i32)
}

fn parse_recommendation(entry: &Value) -> Option<Recommendation> {
    let local_id = entry.get("local_id")?.as_u64()?;
    let reason = entry
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(messages::DEFAULT_REASON)
        .to_string();
    Some(Recommendation { local_id, reason })
}
