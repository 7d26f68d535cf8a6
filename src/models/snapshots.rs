//! Run-scoped snapshots fetched once before item processing
//!
//! Both snapshots are built in the setup phase and passed into the pipeline
//! as immutable values. A fetch failure substitutes the empty snapshot and
//! the run carries on without that signal.

use std::collections::{HashMap, HashSet};

/// Titles exempt from deletion, sourced from the IMDB Top 250 chart
#[derive(Debug, Clone, Default)]
pub struct ExemptionList {
    titles: HashSet<String>,
}

impl ExemptionList {
    pub fn new(titles: impl IntoIterator<Item = String>) -> Self {
        Self {
            titles: titles.into_iter().collect(),
        }
    }

    /// Empty list, used when the chart could not be fetched
    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact title match against the chart
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Requester identity per TMDB id, sourced from the request manager
#[derive(Debug, Clone, Default)]
pub struct RequestLedger {
    requesters: HashMap<String, String>,
}

impl RequestLedger {
    /// Empty ledger, used when the request list could not be fetched
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record a request; the first request for an id wins
    pub fn record(&mut self, tmdb_id: String, requester_email: String) {
        self.requesters.entry(tmdb_id).or_insert(requester_email);
    }

    /// Email of whoever requested this movie, None when it never went
    /// through the request manager
    pub fn requested_by(&self, tmdb_id: &str) -> Option<&str> {
        self.requesters.get(tmdb_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.requesters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requesters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exemption_match_is_exact() {
        let list = ExemptionList::new(vec!["The Godfather".to_string()]);

        assert!(list.contains("The Godfather"));
        assert!(!list.contains("the godfather"));
        assert!(!list.contains("The Godfather Part II"));
    }

    #[test]
    fn test_empty_exemption_list_matches_nothing() {
        let list = ExemptionList::empty();
        assert!(list.is_empty());
        assert!(!list.contains("The Godfather"));
    }

    #[test]
    fn test_first_request_wins() {
        let mut ledger = RequestLedger::empty();
        ledger.record("603".to_string(), "alice@example.com".to_string());
        ledger.record("603".to_string(), "bob@example.com".to_string());

        assert_eq!(ledger.requested_by("603"), Some("alice@example.com"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_unrequested_movie_has_no_requester() {
        let ledger = RequestLedger::empty();
        assert_eq!(ledger.requested_by("603"), None);
    }
}
