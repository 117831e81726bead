//! # Book Search
//!
//! Search a public book catalog (Google Books) and browse the results from
//! the terminal.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Volume, SearchQuery, SearchResponse)
//! - [`catalog`]: Catalog backends behind the [`Catalog`] trait
//! - [`session`]: The search session state machine and its shared handle
//! - [`render`]: Card and detail projections with the defaulting rules
//! - [`ui`]: Terminal presentation of cards, details and the busy spinner
//! - [`utils`]: HTTP client and text-fitting helpers
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use book_search::catalog::GoogleBooksCatalog;
//! use book_search::render::VolumeCard;
//! use book_search::session::{LoadingPolicy, SearchSession, SessionHandle};
//! use book_search::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = GoogleBooksCatalog::new(HttpClient::new()?);
//! let session = SessionHandle::new(SearchSession::new(), LoadingPolicy::immediate());
//!
//! session.search(&catalog, "dune").await;
//! let cards: Vec<VolumeCard> = session.with(|s| s.results().iter().map(VolumeCard::from_volume).collect());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod models;
pub mod render;
pub mod session;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError};
pub use models::Volume;
pub use session::{SearchSession, SessionHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
