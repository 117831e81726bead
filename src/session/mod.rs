//! Search session state.
//!
//! [`SearchSession`] owns the four pieces of UI state: the query buffer,
//! the result set, the selection and the busy flag. They change only through
//! the named transitions on the session:
//!
//! - [`SearchSession::set_query`] edits the query buffer
//! - [`SearchSession::begin_search`] marks a search in flight and hands out a [`SearchTicket`]
//! - [`SearchSession::complete_search`] resolves a ticket with the catalog's answer
//! - [`SearchSession::abandon_search`] releases a ticket whose search was cancelled
//! - [`SearchSession::select`] / [`SearchSession::select_index`] set the selection
//! - [`SearchSession::close_detail`] clears the selection
//!
//! The busy flag is a count of unresolved tickets, so overlapping searches
//! keep the session busy until the last one resolves. Which successful
//! response ends up in the result set is decided by the session's
//! [`ResolutionPolicy`].
//!
//! [`SessionHandle`] wraps a session for sharing between tasks and runs the
//! full submit cycle against a [`Catalog`](crate::catalog::Catalog). A
//! [`PendingSearch`] dropped before it resolves abandons its ticket, so a
//! cancelled submit never leaves the session busy.

mod handle;
mod loading;

pub use handle::{PendingSearch, SessionHandle};
pub use loading::LoadingPolicy;

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::CatalogError;
use crate::models::{SearchQuery, SearchResponse, Volume};

/// How responses to overlapping searches are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Whichever successful response resolves last replaces the result set.
    #[default]
    LastResponseWins,

    /// A successful response replaces the result set only if it was
    /// requested after the one currently shown; stale responses are dropped.
    LatestRequestWins,
}

/// Proof that a search was started, redeemed by [`SearchSession::complete_search`].
#[derive(Debug)]
pub struct SearchTicket {
    seq: u64,
    query: SearchQuery,
    started: Instant,
}

impl SearchTicket {
    /// Submission order of this search (starts at 1)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The query snapshot taken when the search began
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// When the search began
    pub fn started(&self) -> Instant {
        self.started
    }
}

/// What resolving a ticket did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The result set was replaced with `count` volumes.
    Applied { count: usize },

    /// The response answered a search older than the one shown and was dropped.
    Discarded,

    /// The search failed; the result set and selection are untouched.
    Failed(CatalogError),
}

/// Errors from session transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Selection index is outside the current result set
    #[error("No result at position {index} (result set has {len})")]
    NoSuchResult { index: usize, len: usize },
}

/// State container for one search session.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    results: Vec<Volume>,
    results_query: Option<String>,
    total_results: Option<usize>,
    selection: Option<Volume>,
    in_flight: usize,
    next_seq: u64,
    committed_seq: Option<u64>,
    last_error: Option<CatalogError>,
    policy: ResolutionPolicy,
}

impl SearchSession {
    /// Create an empty session using the default resolution policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with an explicit resolution policy
    pub fn with_policy(policy: ResolutionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // ========== TRANSITIONS ==========

    /// Replace the query buffer
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Mark a search as in flight for the current query buffer
    pub fn begin_search(&mut self) -> SearchTicket {
        self.next_seq += 1;
        self.in_flight += 1;

        let ticket = SearchTicket {
            seq: self.next_seq,
            query: SearchQuery::new(self.query.clone()),
            started: Instant::now(),
        };
        tracing::debug!(ticket = ticket.seq, query = %ticket.query.query, in_flight = self.in_flight, "Search started");
        ticket
    }

    /// Resolve a ticket with the catalog's answer
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchResponse, CatalogError>,
    ) -> SearchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    ticket = ticket.seq,
                    query = %ticket.query.query,
                    kind = err.kind(),
                    error = %err,
                    "Search failed"
                );
                self.last_error = Some(err.clone());
                return SearchOutcome::Failed(err);
            }
        };

        if self.is_stale(ticket.seq) {
            tracing::debug!(
                ticket = ticket.seq,
                committed = ?self.committed_seq,
                "Discarding response to a superseded search"
            );
            return SearchOutcome::Discarded;
        }

        let count = response.volumes.len();
        self.results = response.volumes;
        self.results_query = Some(ticket.query.query);
        self.total_results = response.total_results;
        self.committed_seq = Some(ticket.seq);
        self.last_error = None;

        tracing::debug!(ticket = ticket.seq, count, in_flight = self.in_flight, "Result set replaced");
        SearchOutcome::Applied { count }
    }

    /// Release a ticket whose search will never complete (the submit was cancelled)
    pub fn abandon_search(&mut self, seq: u64) {
        self.in_flight = self.in_flight.saturating_sub(1);
        tracing::debug!(ticket = seq, in_flight = self.in_flight, "Search abandoned");
    }

    fn is_stale(&self, seq: u64) -> bool {
        match self.policy {
            ResolutionPolicy::LastResponseWins => false,
            ResolutionPolicy::LatestRequestWins => self.committed_seq.is_some_and(|c| c > seq),
        }
    }

    /// Show a volume in the detail view (a copy is kept)
    pub fn select(&mut self, volume: &Volume) {
        self.selection = Some(volume.clone());
    }

    /// Show the result at `index` (0-based) in the detail view
    pub fn select_index(&mut self, index: usize) -> Result<&Volume, SessionError> {
        let volume = self.results.get(index).ok_or(SessionError::NoSuchResult {
            index,
            len: self.results.len(),
        })?;
        Ok(self.selection.insert(volume.clone()))
    }

    /// Close the detail view
    pub fn close_detail(&mut self) {
        self.selection = None;
    }

    // ========== ACCESSORS ==========

    /// Current query buffer
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current result set
    pub fn results(&self) -> &[Volume] {
        &self.results
    }

    /// Query that produced the current result set, if any search has committed
    pub fn results_query(&self) -> Option<&str> {
        self.results_query.as_deref()
    }

    /// Total matches the catalog reported for the current result set
    pub fn total_results(&self) -> Option<usize> {
        self.total_results
    }

    /// Volume shown in the detail view
    pub fn selection(&self) -> Option<&Volume> {
        self.selection.as_ref()
    }

    /// Whether any search is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of unresolved searches
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Most recent failure, cleared by the next committed search
    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    /// Resolution policy for overlapping searches
    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VolumeBuilder;

    fn response(query: &str, ids: &[&str]) -> SearchResponse {
        let volumes = ids.iter().map(|id| Volume::new(*id, id.to_uppercase())).collect();
        SearchResponse::new(volumes, query)
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = SearchSession::new();
        assert_eq!(session.query(), "");
        assert!(session.results().is_empty());
        assert!(session.selection().is_none());
        assert!(!session.is_busy());
        assert_eq!(session.policy(), ResolutionPolicy::LastResponseWins);
    }

    #[test]
    fn test_begin_sets_busy_and_snapshots_query() {
        let mut session = SearchSession::new();
        session.set_query("dune");
        let ticket = session.begin_search();
        session.set_query("edited meanwhile");

        assert!(session.is_busy());
        assert_eq!(ticket.seq(), 1);
        assert_eq!(ticket.query().query, "dune");
        assert_eq!(ticket.query().max_results, 30);
    }

    #[test]
    fn test_abandoned_search_clears_busy_only() {
        let mut session = SearchSession::new();
        session.set_query("q");
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("q", &["a"])));

        let abandoned = session.begin_search();
        let kept = session.begin_search();
        session.abandon_search(abandoned.seq());
        assert_eq!(session.in_flight(), 1);

        session.complete_search(kept, Err(CatalogError::Network("down".into())));
        assert!(!session.is_busy());
        assert_eq!(session.results()[0].id, "a");
    }

    #[test]
    fn test_successful_search_replaces_results() {
        let mut session = SearchSession::new();
        session.set_query("q");
        let ticket = session.begin_search();
        let outcome = session.complete_search(ticket, Ok(response("q", &["b", "a", "c"])));

        assert_eq!(outcome, SearchOutcome::Applied { count: 3 });
        let ids: Vec<&str> = session.results().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(session.results_query(), Some("q"));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_failed_search_keeps_results_and_selection() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("first", &["x", "y"])));
        session.select_index(1).unwrap();
        let before = session.results().to_vec();

        let ticket = session.begin_search();
        let err = CatalogError::Status {
            status: 500,
            message: "Internal Server Error".into(),
        };
        let outcome = session.complete_search(ticket, Err(err.clone()));

        assert_eq!(outcome, SearchOutcome::Failed(err.clone()));
        assert_eq!(session.results(), before.as_slice());
        assert_eq!(session.selection().map(|v| v.id.as_str()), Some("y"));
        assert_eq!(session.last_error(), Some(&err));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_success_clears_last_error() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        session.complete_search(ticket, Err(CatalogError::Network("offline".into())));
        assert!(session.last_error().is_some());

        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("q", &[])));
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_select_copies_volume() {
        let mut session = SearchSession::new();
        let volume = VolumeBuilder::new("id1", "Dune").publisher("Ace Books").build();
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(SearchResponse::new(vec![volume.clone()], "dune")));

        session.select(&session.results()[0].clone());
        assert_eq!(session.selection(), Some(&volume));

        // Replacing the result set does not disturb the selection
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("other", &["z"])));
        assert_eq!(session.selection(), Some(&volume));
    }

    #[test]
    fn test_select_supersedes_previous_selection() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("q", &["a", "b"])));

        session.select_index(0).unwrap();
        session.select_index(1).unwrap();
        assert_eq!(session.selection().map(|v| v.id.as_str()), Some("b"));
    }

    #[test]
    fn test_select_index_out_of_range() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("q", &["a"])));

        let err = session.select_index(5).unwrap_err();
        assert_eq!(err, SessionError::NoSuchResult { index: 5, len: 1 });
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = SearchSession::new();
        let ticket = session.begin_search();
        session.complete_search(ticket, Ok(response("q", &["a"])));
        session.select_index(0).unwrap();

        session.close_detail();
        assert!(session.selection().is_none());
        session.close_detail();
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_overlap_last_response_wins() {
        let mut session = SearchSession::with_policy(ResolutionPolicy::LastResponseWins);
        session.set_query("a");
        let ticket_a = session.begin_search();
        session.set_query("b");
        let ticket_b = session.begin_search();
        assert_eq!(session.in_flight(), 2);

        // B resolves first, A last
        session.complete_search(ticket_b, Ok(response("b", &["b1"])));
        assert!(session.is_busy());
        let outcome = session.complete_search(ticket_a, Ok(response("a", &["a1"])));

        assert_eq!(outcome, SearchOutcome::Applied { count: 1 });
        assert_eq!(session.results()[0].id, "a1");
        assert_eq!(session.results_query(), Some("a"));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_overlap_latest_request_wins() {
        let mut session = SearchSession::with_policy(ResolutionPolicy::LatestRequestWins);
        session.set_query("a");
        let ticket_a = session.begin_search();
        session.set_query("b");
        let ticket_b = session.begin_search();

        session.complete_search(ticket_b, Ok(response("b", &["b1"])));
        let outcome = session.complete_search(ticket_a, Ok(response("a", &["a1"])));

        assert_eq!(outcome, SearchOutcome::Discarded);
        assert_eq!(session.results()[0].id, "b1");
        assert!(!session.is_busy());
    }

    #[test]
    fn test_latest_request_wins_in_order_resolution() {
        let mut session = SearchSession::with_policy(ResolutionPolicy::LatestRequestWins);
        let ticket_a = session.begin_search();
        let ticket_b = session.begin_search();

        session.complete_search(ticket_a, Ok(response("a", &["a1"])));
        let outcome = session.complete_search(ticket_b, Ok(response("b", &["b1"])));

        assert_eq!(outcome, SearchOutcome::Applied { count: 1 });
        assert_eq!(session.results()[0].id, "b1");
    }

    #[test]
    fn test_resolution_policy_serde_names() {
        let json = serde_json::to_string(&ResolutionPolicy::LatestRequestWins).unwrap();
        assert_eq!(json, "\"latest-request-wins\"");
        let parsed: ResolutionPolicy = serde_json::from_str("\"last-response-wins\"").unwrap();
        assert_eq!(parsed, ResolutionPolicy::LastResponseWins);
    }
}
