//! Mock catalog for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::catalog::{Catalog, CatalogError};
use crate::models::{SearchQuery, SearchResponse, Volume};

/// A mock catalog that returns predefined replies.
///
/// Replies are keyed by query text; queries without a scripted reply get
/// the fallback (an empty result set unless [`MockCatalog::set_fallback`]
/// says otherwise). A query can also be held open with
/// [`MockCatalog::hold`] so tests decide when each response resolves.
#[derive(Debug, Default)]
pub struct MockCatalog {
    replies: Mutex<HashMap<String, Result<Vec<Volume>, CatalogError>>>,
    fallback: Mutex<Option<Result<Vec<Volume>, CatalogError>>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: AtomicUsize,
}

impl MockCatalog {
    /// Create a new mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the volumes returned for a query.
    pub fn set_volumes(&self, query: impl Into<String>, volumes: Vec<Volume>) {
        lock(&self.replies).insert(query.into(), Ok(volumes));
    }

    /// Script a failure for a query.
    pub fn set_error(&self, query: impl Into<String>, error: CatalogError) {
        lock(&self.replies).insert(query.into(), Err(error));
    }

    /// Set the reply used for queries with nothing scripted.
    pub fn set_fallback(&self, reply: Result<Vec<Volume>, CatalogError>) {
        *lock(&self.fallback) = Some(reply);
    }

    /// Hold the next search for `query` until the returned sender fires (or is dropped).
    pub fn hold(&self, query: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(query.into(), rx);
        tx
    }

    /// Number of searches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Clear all scripted replies and gates.
    pub fn clear(&self) {
        lock(&self.replies).clear();
        lock(&self.gates).clear();
        *lock(&self.fallback) = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Catalog for MockCatalog {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Catalog"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = lock(&self.gates).remove(&query.query);
        if let Some(gate) = gate {
            // A dropped sender releases the search as well.
            let _ = gate.await;
        }

        let reply = lock(&self.replies)
            .get(&query.query)
            .cloned()
            .or_else(|| lock(&self.fallback).clone())
            .unwrap_or_else(|| Ok(Vec::new()));

        reply.map(|volumes| {
            let total = volumes.len();
            SearchResponse::new(volumes, &query.query).total_results(total)
        })
    }
}

/// Helper function to create a mock volume for testing.
pub fn make_volume(id: &str, title: &str) -> Volume {
    Volume::new(id, title)
}
