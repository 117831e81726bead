//! Book catalog backends.
//!
//! This module defines the [`Catalog`] trait that every catalog backend
//! implements. The production backend is [`GoogleBooksCatalog`], which talks
//! to the public Google Books `volumes` endpoint. [`MockCatalog`] returns
//! scripted replies and is used to drive the search session in tests.
//!
//! A backend performs exactly one request per call to [`Catalog::search`]
//! and never retries. Every failure (transport, non-success status, or an
//! undecodable body) comes back as a [`CatalogError`].

mod google_books;
pub mod mock;

pub use google_books::{GoogleBooksCatalog, GOOGLE_BOOKS_API_BASE};
pub use mock::MockCatalog;

use crate::models::{SearchQuery, SearchResponse};
use async_trait::async_trait;

/// Interface for book catalog backends.
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this catalog (e.g. "google_books")
    fn id(&self) -> &str;

    /// Human-readable name of this catalog
    fn name(&self) -> &str;

    /// Search for volumes matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, CatalogError>;
}

/// Errors that can occur when querying a catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Catalog returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Short label for the failure class, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Network(_) => "network",
            CatalogError::Status { .. } => "status",
            CatalogError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Parse(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(CatalogError::Network("down".into()).kind(), "network");
        assert_eq!(
            CatalogError::Status {
                status: 503,
                message: "Service Unavailable".into()
            }
            .kind(),
            "status"
        );
        assert_eq!(CatalogError::Parse("eof".into()).kind(), "parse");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let catalog_err: CatalogError = err.into();
        assert!(matches!(catalog_err, CatalogError::Parse(msg) if msg.starts_with("JSON:")));
    }

    #[test]
    fn test_status_error_display() {
        let err = CatalogError::Status {
            status: 400,
            message: "Bad Request".into(),
        };
        assert_eq!(err.to_string(), "Catalog returned status 400: Bad Request");
    }
}
