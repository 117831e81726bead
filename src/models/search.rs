//! Search request and response models.

use serde::{Deserialize, Serialize};

use crate::models::Volume;

/// Number of volumes requested per search. The catalog is never paged.
pub const MAX_RESULTS: usize = 30;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Raw query text, sent as typed (empty is allowed)
    pub query: String,

    /// Maximum number of results to request
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: MAX_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Search response containing volumes and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Volumes found, in service order
    pub volumes: Vec<Volume>,

    /// Total number of matches reported by the service (may exceed `volumes.len()`)
    pub total_results: Option<usize>,

    /// Query that was executed
    pub query: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(volumes: Vec<Volume>, query: impl Into<String>) -> Self {
        Self {
            volumes,
            total_results: None,
            query: query.into(),
        }
    }

    /// Set total results
    pub fn total_results(mut self, total: usize) -> Self {
        self.total_results = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_uses_fixed_cap() {
        let query = SearchQuery::new("dune");
        assert_eq!(query.query, "dune");
        assert_eq!(query.max_results, 30);
    }

    #[test]
    fn test_empty_query_is_allowed() {
        let query = SearchQuery::new("");
        assert!(query.query.is_empty());
        assert_eq!(query.max_results, MAX_RESULTS);
    }

    #[test]
    fn test_search_response_total() {
        let response = SearchResponse::new(vec![Volume::new("a", "A")], "a").total_results(120);
        assert_eq!(response.volumes.len(), 1);
        assert_eq!(response.total_results, Some(120));
        assert_eq!(response.query, "a");
    }
}
