//! Google Books catalog implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogError};
use crate::config::CatalogConfig;
use crate::models::{SearchQuery, SearchResponse, Volume};
use crate::utils::{HttpClient, DEFAULT_USER_AGENT};

/// Public Google Books API base URL
pub const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Google Books catalog
///
/// Uses the public `volumes` endpoint, which needs no API key.
#[derive(Debug, Clone)]
pub struct GoogleBooksCatalog {
    http: HttpClient,
    base_url: String,
}

impl GoogleBooksCatalog {
    /// Create a catalog pointed at the public API
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_url(http, GOOGLE_BOOKS_API_BASE)
    }

    /// Create a catalog pointed at a different base URL (mirrors, mock servers)
    pub fn with_base_url(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a catalog from configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let http = HttpClient::with_options(user_agent, config.timeout())?;
        Ok(Self::with_base_url(http, &config.base_url))
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build request URL
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Decode a raw response body into a search response
    pub fn parse_response(body: &str, query: &str) -> Result<SearchResponse, CatalogError> {
        let data: VolumesResponse = serde_json::from_str(body)?;
        Ok(Self::into_search_response(data, query))
    }

    fn into_search_response(data: VolumesResponse, query: &str) -> SearchResponse {
        let volumes = data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Self::parse_volume)
            .collect();

        let mut response = SearchResponse::new(volumes, query);
        response.total_results = data.total_items;
        response
    }

    /// Flatten the nested wire record into a Volume
    fn parse_volume(item: GBVolume) -> Volume {
        let info = item.volume_info.unwrap_or_default();
        let access = item.access_info.unwrap_or_default();

        Volume {
            id: item.id,
            title: info.title.unwrap_or_default(),
            authors: non_empty(info.authors),
            publisher: non_blank(info.publisher),
            description: non_blank(info.description),
            published_date: non_blank(info.published_date),
            categories: non_empty(info.categories),
            thumbnail: non_blank(info.image_links.and_then(|links| links.thumbnail)),
            preview_link: non_blank(info.preview_link),
            buy_link: non_blank(item.sale_info.and_then(|sale| sale.buy_link)),
            pdf_link: non_blank(access.pdf.and_then(|pdf| pdf.acs_token_link)),
            epub_link: non_blank(access.epub.and_then(|epub| epub.acs_token_link)),
        }
    }
}

/// Blank strings count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Empty lists, and lists holding only blank strings, count as absent.
/// Otherwise the list is kept as sent.
fn non_empty(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.filter(|v| v.iter().any(|s| !s.trim().is_empty()))
}

#[async_trait]
impl Catalog for GoogleBooksCatalog {
    fn id(&self) -> &str {
        "google_books"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, CatalogError> {
        let url = self.build_url("/volumes");
        let max_results = query.max_results.to_string();

        tracing::debug!(url = %url, query = %query.query, max_results = query.max_results, "Searching Google Books");

        let response = self
            .http
            .client()
            .get(&url)
            .query(&[("q", query.query.as_str()), ("maxResults", max_results.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to search Google Books: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to read response body: {}", e)))?;

        let response = Self::parse_response(&body, &query.query)?;
        tracing::debug!(
            count = response.volumes.len(),
            total = ?response.total_results,
            "Google Books search complete"
        );
        Ok(response)
    }
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    total_items: Option<usize>,
    items: Option<Vec<GBVolume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBVolume {
    id: String,
    volume_info: Option<GBVolumeInfo>,
    sale_info: Option<GBSaleInfo>,
    access_info: Option<GBAccessInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBVolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    description: Option<String>,
    published_date: Option<String>,
    categories: Option<Vec<String>>,
    image_links: Option<GBImageLinks>,
    preview_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GBImageLinks {
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBSaleInfo {
    buy_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GBAccessInfo {
    pdf: Option<GBAccessLink>,
    epub: Option<GBAccessLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBAccessLink {
    acs_token_link: Option<String>,
}
