//! Terminal display utilities for CLI output formatting.
//!
//! Handles terminal size detection and width-aware text fitting, so wide
//! characters (CJK titles, emoji) don't break table layout.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

/// Get the current terminal width in characters.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

/// Display width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(1)).sum()
}

/// Truncate text to fit within `max_width` columns, appending "..." when cut.
///
/// # Examples
///
/// ```
/// use book_search::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let kept: String = text
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(1);
            used <= budget
        })
        .collect();

    format!("{}...", kept)
}

/// Word-wrap `text` into lines of at most `width` columns.
///
/// Words wider than `width` get a line of their own rather than being split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && display_width(&line) + 1 + display_width(word) > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Column widths for the result card table: (index, title, authors, publisher, actions).
///
/// Title gets half of whatever is left after the fixed columns; authors and
/// publisher split the rest.
pub fn card_table_columns(terminal_width: usize) -> (usize, usize, usize, usize, usize) {
    const INDEX: usize = 3;
    const ACTIONS: usize = 14;
    // Borders and padding of a 5-column UTF8 table
    const CHROME: usize = 16;

    let flexible = terminal_width.saturating_sub(INDEX + ACTIONS + CHROME).max(36);
    let title = flexible / 2;
    let authors = (flexible - title) / 2;
    let publisher = flexible - title - authors;

    (INDEX, title, authors, publisher, ACTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis_basic() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_with_ellipsis_edges() {
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 0), "");
        assert_eq!(truncate_with_ellipsis("Hello", 1), "...");
    }

    #[test]
    fn test_truncate_wide_characters() {
        // Each CJK character is two columns wide
        let title = "三体三体三体";
        assert_eq!(display_width(title), 12);
        assert_eq!(truncate_with_ellipsis(title, 8), "三体...");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_text_long_word() {
        let lines = wrap_text("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
        assert!(wrap_text("", 5).is_empty());
    }

    #[test]
    fn test_card_table_columns_fit() {
        let (index, title, authors, publisher, actions) = card_table_columns(120);
        assert_eq!(title + authors + publisher, 120 - 3 - 14 - 16);
        assert!(title >= authors && authors >= 1 && publisher >= 1);
        assert_eq!((index, actions), (3, 14));
    }

    #[test]
    fn test_card_table_columns_narrow_terminal() {
        let (_, title, authors, publisher, _) = card_table_columns(20);
        assert_eq!(title + authors + publisher, 36);
    }
}
