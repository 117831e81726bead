//! Display-ready projections of a [`Volume`].
//!
//! [`VolumeCard`] is the summary shown in the result list and
//! [`VolumeDetail`] is the expanded view of the selection. Both apply the
//! defaulting rules for absent fields here, so every front end (terminal
//! table, plain text, JSON) shows the same thing.

use serde::Serialize;

use crate::models::Volume;

/// Cover shown on a card when the volume has no thumbnail
pub const CARD_PLACEHOLDER_IMAGE: &str = "https://placehold.co/400x300/orange/white";

/// Cover shown in the detail view when the volume has no thumbnail
pub const DETAIL_PLACEHOLDER_IMAGE: &str = "https://placehold.co/150x100/orange/white";

/// Shown for missing authors, publisher or categories
pub const UNKNOWN: &str = "Unknown";

/// Shown for a missing publication date
pub const DATE_PLACEHOLDER: &str = "DD-MM-YYYY";

/// Shown for a missing description
pub const NO_DESCRIPTION: &str = "No Data Found in this book";

/// Descriptions longer than this many characters are cut
pub const DESCRIPTION_LIMIT: usize = 150;

/// Appended to a cut description
pub const ELLIPSIS: &str = "...";

/// An action offered on a result card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum CardAction {
    Buy(String),
    DownloadPdf(String),
    DownloadEpub(String),
}

impl CardAction {
    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            CardAction::Buy(_) => "Buy",
            CardAction::DownloadPdf(_) => "Download PDF",
            CardAction::DownloadEpub(_) => "Download EPUB",
        }
    }

    /// Target URL
    pub fn url(&self) -> &str {
        match self {
            CardAction::Buy(url) | CardAction::DownloadPdf(url) | CardAction::DownloadEpub(url) => url,
        }
    }
}

/// Summary card for one volume in the result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeCard {
    pub id: String,
    pub title: String,
    pub image: String,
    pub authors: String,
    pub publisher: String,
    /// Only the actions whose links are present, in Buy, PDF, EPUB order
    pub actions: Vec<CardAction>,
}

impl VolumeCard {
    /// Project a volume into a card
    pub fn from_volume(volume: &Volume) -> Self {
        let actions = [
            volume.buy_link.clone().map(CardAction::Buy),
            volume.pdf_link.clone().map(CardAction::DownloadPdf),
            volume.epub_link.clone().map(CardAction::DownloadEpub),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            id: volume.id.clone(),
            title: volume.title.clone(),
            image: image_or(volume, CARD_PLACEHOLDER_IMAGE),
            authors: authors_text(volume),
            publisher: publisher_text(volume),
            actions,
        }
    }
}

/// Expanded view of the selected volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDetail {
    pub id: String,
    pub title: String,
    pub image: String,
    pub authors: String,
    pub publisher: String,
    pub categories: String,
    pub published_date: String,
    pub description: String,
    pub preview_link: Option<String>,
}

impl VolumeDetail {
    /// Project a volume into a detail view
    pub fn from_volume(volume: &Volume) -> Self {
        Self {
            id: volume.id.clone(),
            title: volume.title.clone(),
            image: image_or(volume, DETAIL_PLACEHOLDER_IMAGE),
            authors: authors_text(volume),
            publisher: publisher_text(volume),
            categories: volume
                .categories
                .as_ref()
                .map_or_else(|| UNKNOWN.to_string(), |c| c.join(",")),
            published_date: volume
                .published_date
                .clone()
                .unwrap_or_else(|| DATE_PLACEHOLDER.to_string()),
            description: volume
                .description
                .as_deref()
                .map_or_else(|| NO_DESCRIPTION.to_string(), shorten_description),
            preview_link: volume.preview_link.clone(),
        }
    }

    /// Detail view of the selection, or nothing when there is no selection
    pub fn for_selection(selection: Option<&Volume>) -> Option<Self> {
        selection.map(Self::from_volume)
    }
}

fn image_or(volume: &Volume, placeholder: &str) -> String {
    volume
        .thumbnail
        .clone()
        .unwrap_or_else(|| placeholder.to_string())
}

fn authors_text(volume: &Volume) -> String {
    volume
        .authors
        .as_ref()
        .map_or_else(|| UNKNOWN.to_string(), |a| a.join(", "))
}

fn publisher_text(volume: &Volume) -> String {
    volume
        .publisher
        .clone()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Cut a description to [`DESCRIPTION_LIMIT`] characters plus [`ELLIPSIS`].
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character.
pub fn shorten_description(text: &str) -> String {
    match text.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VolumeBuilder;

    #[test]
    fn test_description_at_limit_unchanged() {
        let text = "a".repeat(150);
        assert_eq!(shorten_description(&text), text);
    }

    #[test]
    fn test_description_over_limit_cut() {
        let text = "b".repeat(151);
        let shown = shorten_description(&text);
        assert_eq!(shown, format!("{}...", "b".repeat(150)));
    }

    #[test]
    fn test_description_multibyte() {
        let text = "é".repeat(160);
        let shown = shorten_description(&text);
        assert_eq!(shown.chars().count(), 153);
        assert!(shown.starts_with(&"é".repeat(150)));
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_short_description_unchanged() {
        assert_eq!(shorten_description(""), "");
        assert_eq!(shorten_description("Short."), "Short.");
    }

    #[test]
    fn test_card_defaults() {
        let card = VolumeCard::from_volume(&Volume::new("x", "Bare"));
        assert_eq!(card.image, CARD_PLACEHOLDER_IMAGE);
        assert_eq!(card.authors, "Unknown");
        assert_eq!(card.publisher, "Unknown");
        assert!(card.actions.is_empty());
    }

    #[test]
    fn test_card_present_fields() {
        let volume = VolumeBuilder::new("x", "Good Omens")
            .authors(["Terry Pratchett", "Neil Gaiman"])
            .publisher("Gollancz")
            .thumbnail("http://img/1")
            .build();
        let card = VolumeCard::from_volume(&volume);
        assert_eq!(card.title, "Good Omens");
        assert_eq!(card.image, "http://img/1");
        assert_eq!(card.authors, "Terry Pratchett, Neil Gaiman");
        assert_eq!(card.publisher, "Gollancz");
    }

    #[test]
    fn test_card_actions_independent() {
        let volume = VolumeBuilder::new("x", "T")
            .buy_link("http://buy")
            .epub_link("http://epub")
            .build();
        let card = VolumeCard::from_volume(&volume);
        assert_eq!(
            card.actions,
            vec![
                CardAction::Buy("http://buy".into()),
                CardAction::DownloadEpub("http://epub".into()),
            ]
        );
        assert_eq!(card.actions[1].label(), "Download EPUB");
        assert_eq!(card.actions[1].url(), "http://epub");
    }

    #[test]
    fn test_detail_defaults() {
        let detail = VolumeDetail::from_volume(&Volume::new("x", "Bare"));
        assert_eq!(detail.image, DETAIL_PLACEHOLDER_IMAGE);
        assert_eq!(detail.authors, "Unknown");
        assert_eq!(detail.publisher, "Unknown");
        assert_eq!(detail.categories, "Unknown");
        assert_eq!(detail.published_date, "DD-MM-YYYY");
        assert_eq!(detail.description, "No Data Found in this book");
        assert!(detail.preview_link.is_none());
    }

    #[test]
    fn test_detail_present_fields() {
        let volume = VolumeBuilder::new("x", "T")
            .categories(["Fiction", "Science Fiction"])
            .published_date("1965")
            .description("A desert planet.")
            .preview_link("http://preview")
            .build();
        let detail = VolumeDetail::from_volume(&volume);
        assert_eq!(detail.categories, "Fiction,Science Fiction");
        assert_eq!(detail.published_date, "1965");
        assert_eq!(detail.description, "A desert planet.");
        assert_eq!(detail.preview_link.as_deref(), Some("http://preview"));
    }

    #[test]
    fn test_detail_for_selection() {
        assert!(VolumeDetail::for_selection(None).is_none());
        let volume = Volume::new("x", "T");
        assert_eq!(
            VolumeDetail::for_selection(Some(&volume)).map(|d| d.id),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_card_action_serialization() {
        let json = serde_json::to_value(CardAction::DownloadPdf("http://pdf".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "download_pdf", "url": "http://pdf"}));
    }
}
