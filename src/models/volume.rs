//! Volume model representing a single book record from the catalog.

use serde::{Deserialize, Serialize};

/// A book record as returned by the catalog service.
///
/// Every field the service may omit is an `Option`. Blank strings and empty
/// lists are normalized to `None` when the record is decoded, so a `Some`
/// always carries something worth showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Opaque identifier, unique within a result set
    pub id: String,

    /// Title (empty when the service sends none)
    pub title: String,

    /// Authors in the order the service lists them
    pub authors: Option<Vec<String>>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Free-text description
    pub description: Option<String>,

    /// Publication date, free-form ("2005", "2005-08", "2005-08-02", ...)
    pub published_date: Option<String>,

    /// Subject categories
    pub categories: Option<Vec<String>>,

    /// Cover thumbnail URL
    pub thumbnail: Option<String>,

    /// Preview page URL
    pub preview_link: Option<String>,

    /// Purchase page URL
    pub buy_link: Option<String>,

    /// PDF acquisition URL
    pub pdf_link: Option<String>,

    /// EPUB acquisition URL
    pub epub_link: Option<String>,
}

impl Volume {
    /// Create a volume with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: None,
            publisher: None,
            description: None,
            published_date: None,
            categories: None,
            thumbnail: None,
            preview_link: None,
            buy_link: None,
            pdf_link: None,
            epub_link: None,
        }
    }
}

/// Builder for constructing Volume objects
#[derive(Debug, Clone)]
pub struct VolumeBuilder {
    volume: Volume,
}

impl VolumeBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            volume: Volume::new(id, title),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.volume.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    /// Set publisher
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.volume.publisher = Some(publisher.into());
        self
    }

    /// Set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.volume.description = Some(description.into());
        self
    }

    /// Set publication date
    pub fn published_date(mut self, date: impl Into<String>) -> Self {
        self.volume.published_date = Some(date.into());
        self
    }

    /// Set categories
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.volume.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Set thumbnail URL
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.volume.thumbnail = Some(url.into());
        self
    }

    /// Set preview URL
    pub fn preview_link(mut self, url: impl Into<String>) -> Self {
        self.volume.preview_link = Some(url.into());
        self
    }

    /// Set purchase URL
    pub fn buy_link(mut self, url: impl Into<String>) -> Self {
        self.volume.buy_link = Some(url.into());
        self
    }

    /// Set PDF URL
    pub fn pdf_link(mut self, url: impl Into<String>) -> Self {
        self.volume.pdf_link = Some(url.into());
        self
    }

    /// Set EPUB URL
    pub fn epub_link(mut self, url: impl Into<String>) -> Self {
        self.volume.epub_link = Some(url.into());
        self
    }

    /// Build the Volume
    pub fn build(self) -> Volume {
        self.volume
    }
}
