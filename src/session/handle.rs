//! Shared handle that runs searches against a catalog.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::{Catalog, CatalogError};
use crate::models::{SearchResponse, Volume};
use crate::session::{
    LoadingPolicy, SearchOutcome, SearchSession, SearchTicket, SessionError,
};

/// Cloneable handle to a [`SearchSession`].
///
/// The lock is held only for individual transitions, never across the
/// network call, so other tasks can read the session (or start another
/// search) while a search is in flight.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SearchSession>>,
    loading: LoadingPolicy,
}

impl SessionHandle {
    /// Wrap a session
    pub fn new(session: SearchSession, loading: LoadingPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            loading,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a search for the current query buffer.
    ///
    /// The session is busy from here on. The ticket is released when the
    /// returned [`PendingSearch`] finishes running or is dropped.
    pub fn start(&self) -> PendingSearch {
        let ticket = self.lock().begin_search();
        PendingSearch::new(self.clone(), ticket)
    }

    /// Replace the query buffer and start a search for it in one step
    pub fn start_query(&self, text: impl Into<String>) -> PendingSearch {
        let ticket = {
            let mut session = self.lock();
            session.set_query(text);
            session.begin_search()
        };
        PendingSearch::new(self.clone(), ticket)
    }

    /// Submit the current query buffer.
    ///
    /// Issues exactly one catalog request. A successful response is held
    /// until the loading policy's minimum display time has passed, then
    /// committed. Failures are committed immediately.
    pub async fn submit(&self, catalog: &dyn Catalog) -> SearchOutcome {
        self.start().run(catalog).await
    }

    /// Replace the query buffer and submit it
    pub async fn search(&self, catalog: &dyn Catalog, text: impl Into<String>) -> SearchOutcome {
        self.start_query(text).run(catalog).await
    }

    /// Replace the query buffer
    pub fn set_query(&self, text: impl Into<String>) {
        self.lock().set_query(text);
    }

    /// Select the result at `index` (0-based), returning a copy of it
    pub fn select_index(&self, index: usize) -> Result<Volume, SessionError> {
        self.lock().select_index(index).cloned()
    }

    /// Select a volume directly
    pub fn select(&self, volume: &Volume) {
        self.lock().select(volume);
    }

    /// Close the detail view
    pub fn close_detail(&self) {
        self.lock().close_detail();
    }

    /// Whether any search is in flight
    pub fn is_busy(&self) -> bool {
        self.lock().is_busy()
    }

    /// Number of unresolved searches
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight()
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> SearchSession {
        self.lock().clone()
    }

    /// Run a read-only closure against the session
    pub fn with<R>(&self, f: impl FnOnce(&SearchSession) -> R) -> R {
        f(&self.lock())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new(SearchSession::new(), LoadingPolicy::immediate())
    }
}

/// A started search that has not resolved yet.
///
/// Can be moved into a spawned task; [`PendingSearch::run`] performs the
/// catalog call and commits the outcome.
#[derive(Debug)]
pub struct PendingSearch {
    ticket: SearchTicket,
    guard: InFlightGuard,
}

impl PendingSearch {
    fn new(handle: SessionHandle, ticket: SearchTicket) -> Self {
        let guard = InFlightGuard {
            seq: ticket.seq(),
            handle: Some(handle),
        };
        Self { ticket, guard }
    }

    /// Submission order of this search
    pub fn seq(&self) -> u64 {
        self.ticket.seq()
    }

    /// Query text this search was started with
    pub fn query(&self) -> &str {
        &self.ticket.query().query
    }

    /// Call the catalog and commit the outcome to the session
    pub async fn run(self, catalog: &dyn Catalog) -> SearchOutcome {
        let PendingSearch { ticket, guard } = self;
        let result = catalog.search(ticket.query()).await;

        if result.is_ok() {
            let hold = guard.loading().remaining(ticket.started().elapsed());
            if !hold.is_zero() {
                tokio::time::sleep(hold).await;
            }
        }

        guard.complete(ticket, result)
    }
}

/// Releases the ticket if the search is dropped before it completes.
#[derive(Debug)]
struct InFlightGuard {
    seq: u64,
    handle: Option<SessionHandle>,
}

impl InFlightGuard {
    fn loading(&self) -> LoadingPolicy {
        self.handle
            .as_ref()
            .map_or_else(LoadingPolicy::immediate, |h| h.loading)
    }

    fn complete(
        mut self,
        ticket: SearchTicket,
        result: Result<SearchResponse, CatalogError>,
    ) -> SearchOutcome {
        match self.handle.take() {
            Some(handle) => handle.lock().complete_search(ticket, result),
            None => SearchOutcome::Discarded,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.lock().abandon_search(self.seq);
        }
    }
}
