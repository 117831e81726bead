//! Terminal presentation for search sessions.
//!
//! Colored status lines, the result card table, the boxed detail view and
//! the busy spinner. Everything here consumes the shaped projections from
//! [`crate::render`]; no defaulting happens at this layer.

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::render::{VolumeCard, VolumeDetail};
use crate::utils::{card_table_columns, terminal_width, truncate_with_ellipsis, wrap_text};

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Welcome banner for the interactive prompt.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("{}", format!("📚 Book Search v{}", version).bold().cyan());
    println!("{}", "Type a query and press Enter to search the catalog.".dimmed());
    println!(
        "{}",
        "Commands: :open <n>  :close  :results  :help  :quit".dimmed()
    );
    println!();
}

/// Print the interactive command reference.
pub fn print_help() {
    print_section("Commands");
    println!("  <text>        Search for <text> (an empty line searches the empty query)");
    println!("  :open <n>     Show details for result n");
    println!("  :close        Close the detail view");
    println!("  :results      Show the current results again");
    println!("  :help         Show this help");
    println!("  :quit         Exit");
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print search results header.
pub fn print_search_header(query: &str, count: usize, total: Option<usize>, duration: Duration) {
    println!();
    println!(
        "{} Results for: \"{}\"",
        status_icon(Status::Search).yellow().bold(),
        query.cyan().bold()
    );
    let found = match total {
        Some(total) if total > count => format!("{} of {}", count, format_number(total)),
        _ => count.to_string(),
    };
    println!(
        "{} Showing {} volumes in {:.2}s",
        "─".repeat(30).dimmed(),
        found.green().bold(),
        duration.as_secs_f64()
    );
    println!();
}

/// Build the result card table.
pub fn cards_table(cards: &[VolumeCard], width: usize) -> Table {
    let (_, title_w, authors_w, publisher_w, _) = card_table_columns(width);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["#", "Title", "Author(s)", "Publisher", "Actions"]);

    for (i, card) in cards.iter().enumerate() {
        let actions = card
            .actions
            .iter()
            .map(|a| a.label())
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_with_ellipsis(&card.title, title_w)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&card.authors, authors_w)),
            Cell::new(truncate_with_ellipsis(&card.publisher, publisher_w)),
            Cell::new(actions),
        ]);
    }

    table
}

/// Print the result cards as a table sized to the terminal.
pub fn print_cards(cards: &[VolumeCard]) {
    if cards.is_empty() {
        print_status(Status::Info, "No volumes to show");
        return;
    }
    println!("{}", cards_table(cards, terminal_width()));
    println!("{}", "Use :open <n> (or --open <n>) to see details.".dimmed());
}

/// Lines of the detail view, without styling.
pub fn detail_lines(detail: &VolumeDetail, width: usize) -> Vec<String> {
    let mut lines = vec![
        detail.title.clone(),
        String::new(),
        format!("Cover: {}", detail.image),
        format!("Author(s): {}", detail.authors),
        format!("Publisher: {}", detail.publisher),
        format!("Categories: {}", detail.categories),
        format!("Published Date: {}", detail.published_date),
        String::new(),
    ];

    let description = format!("Description: {}", detail.description);
    lines.extend(wrap_text(&description, width));

    if let Some(preview) = &detail.preview_link {
        lines.push(String::new());
        lines.push(format!("Preview The Book: {}", preview));
    }
    lines
}

/// Print the detail view in a box.
pub fn print_detail(detail: &VolumeDetail) {
    let inner = terminal_width().clamp(40, 100) - 4;
    let lines = detail_lines(detail, inner);

    println!();
    println!("┌{}┐", "─".repeat(inner + 2));
    for (i, line) in lines.iter().enumerate() {
        let fitted = truncate_with_ellipsis(line, inner);
        let pad = inner.saturating_sub(crate::utils::display_width(&fitted));
        if i == 0 {
            println!("│ {}{} │", fitted.blue().bold(), " ".repeat(pad));
        } else {
            println!("│ {}{} │", fitted, " ".repeat(pad));
        }
    }
    println!("└{}┘", "─".repeat(inner + 2));
    println!("{}", "Use :close to dismiss.".dimmed());
}

/// Format a number with commas.
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Spinner shown while the session is busy.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) =
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
        {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Spinner that draws nothing (quiet mode, non-terminal output)
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.red} {msg}") {
            self.pb.set_style(style.tick_chars(" ✗"));
        }
        self.pb.finish_with_message(msg.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}
