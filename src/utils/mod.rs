//! Utility modules supporting catalog access and terminal output.
//!
//! - [`HttpClient`]: shared reqwest client with the crate's user agent
//! - [`truncate_with_ellipsis`], [`wrap_text`]: width-aware text fitting for the terminal
//!
//! # HTTP Client
//!
//! ```rust,no_run
//! use book_search::catalog::GoogleBooksCatalog;
//! use book_search::utils::HttpClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let catalog = GoogleBooksCatalog::new(client);
//! # Ok(())
//! # }
//! ```

mod display;
mod http;

pub use display::{
    card_table_columns, display_width, is_terminal, terminal_width, truncate_with_ellipsis,
    wrap_text,
};
pub use http::{HttpClient, DEFAULT_USER_AGENT};
