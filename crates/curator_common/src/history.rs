//! Recent query history: most-recent-first, de-duplicated, capped.

use serde::{Deserialize, Serialize};

/// Default number of remembered queries
pub const DEFAULT_HISTORY_CAP: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHistory {
    entries: Vec<String>,
    #[serde(skip, default = "default_cap")]
    cap: usize,
}

fn default_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }
}

impl QueryHistory {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Rebuild from persisted entries, re-applying trimming, de-dup and cap.
    pub fn from_entries(entries: Vec<String>, cap: usize) -> Self {
        let mut history = Self::with_cap(cap);
        for term in entries.into_iter().rev() {
            history.push(&term);
        }
        history
    }

    /// Record a submitted term. A re-submitted term moves to the front.
    pub fn push(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.entries.retain(|existing| existing != term);
        self.entries.insert(0, term.to_string());
        self.entries.truncate(self.cap);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resubmitted_term_moves_to_front() {
        let mut history = QueryHistory::default();
        history.push("a");
        history.push("b");
        history.push("a");
        assert_eq!(history.entries(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let mut history = QueryHistory::default();
        for i in 0..12 {
            history.push(&format!("q{}", i));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAP);
        assert_eq!(history.entries()[0], "q11");
        assert_eq!(history.entries()[7], "q4");
    }

    #[test]
    fn test_blank_and_padded_terms() {
        let mut history = QueryHistory::default();
        history.push("   ");
        assert!(history.is_empty());
        history.push(" tea ");
        history.push("tea");
        assert_eq!(history.entries(), &["tea".to_string()]);
    }

    #[test]
    fn test_from_entries_preserves_order() {
        let history = QueryHistory::from_entries(
            vec!["c".to_string(), "b".to_string(), "c".to_string(), "a".to_string()],
            3,
        );
        assert_eq!(history.entries(), &["c".to_string(), "b".to_string(), "a".to_string()]);
    }
}
