use anyhow::{Context, Result};
use book_search::catalog::{Catalog, GoogleBooksCatalog};
use book_search::config::{
    default_config_path, find_config_file, load_config, Config, ConfigFile, LogFormat,
};
use book_search::render::{VolumeCard, VolumeDetail};
use book_search::session::{LoadingPolicy, SearchOutcome, SearchSession, SessionHandle};
use book_search::ui::{self, Spinner, Status};
use book_search::utils::is_terminal;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Book Search - search the Google Books catalog from the terminal
#[derive(Parser, Debug)]
#[command(name = "book-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search the Google Books catalog and browse volume details", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the catalog once and print the result cards
    #[command(alias = "s")]
    Search {
        /// Search query string (sent as typed; may be empty)
        query: String,

        /// Show details for the n-th result (1-based)
        #[arg(long, value_parser = parse_result_number)]
        open: Option<usize>,
    },

    /// Interactive prompt: search, open and close results (default)
    #[command(alias = "i")]
    Interactive,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a configuration file with default settings
    Init {
        /// Where to write the file (default: per-user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Parse a 1-based result number
fn parse_result_number(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("result numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(err.to_string()),
    }
}

/// A line typed at the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptCommand {
    Search(String),
    Open(usize),
    Close,
    Results,
    Help,
    Quit,
    Invalid(String),
}

impl PromptCommand {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return PromptCommand::Search(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("open" | "o"), Some(n)) => match parse_result_number(n) {
                Ok(n) => PromptCommand::Open(n),
                Err(err) => PromptCommand::Invalid(format!("not a result number: {} ({})", n, err)),
            },
            (Some("open" | "o"), None) => PromptCommand::Invalid("usage: :open <n>".to_string()),
            (Some("close" | "c"), _) => PromptCommand::Close,
            (Some("results" | "r"), _) => PromptCommand::Results,
            (Some("help" | "h" | "?"), _) => PromptCommand::Help,
            (Some("quit" | "q" | "exit"), _) => PromptCommand::Quit,
            _ => PromptCommand::Invalid(format!("unknown command: {}", trimmed)),
        }
    }
}

/// JSON shape of a session view
#[derive(Debug, Serialize)]
struct SessionView {
    query: Option<String>,
    total_results: Option<usize>,
    results: Vec<VolumeCard>,
    selection: Option<VolumeDetail>,
}

impl SessionView {
    fn of(session: &SearchSession) -> Self {
        Self {
            query: session.results_query().map(str::to_string),
            total_results: session.total_results(),
            results: session.results().iter().map(VolumeCard::from_volume).collect(),
            selection: VolumeDetail::for_selection(session.selection()),
        }
    }
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Book Search - Environment Variables");
    println!();
    println!("Catalog:");
    println!("  BOOK_SEARCH_CATALOG__BASE_URL          API base URL (default: https://www.googleapis.com/books/v1)");
    println!("  BOOK_SEARCH_CATALOG__TIMEOUT_SECONDS   Overall request timeout (default: none)");
    println!("  BOOK_SEARCH_CATALOG__USER_AGENT        User agent override");
    println!();
    println!("Loading:");
    println!("  BOOK_SEARCH_LOADING__MIN_DISPLAY_MS    Minimum time the loading spinner stays up (default: 1000)");
    println!();
    println!("Session:");
    println!("  BOOK_SEARCH_SESSION__RESOLUTION        last-response-wins | latest-request-wins (default: last-response-wins)");
    println!();
    println!("Logging:");
    println!("  BOOK_SEARCH_LOGGING__LEVEL             Log level when RUST_LOG is unset (default: info)");
    println!("  BOOK_SEARCH_LOGGING__FORMAT            pretty | json (default: pretty)");
    println!("  RUST_LOG                               Full tracing filter, overrides everything else");
    println!();
    println!("Global Proxy Settings:");
    println!("  HTTP_PROXY / HTTPS_PROXY / NO_PROXY    Honored by the HTTP client");
    println!();
    println!("Example:");
    println!("  export BOOK_SEARCH_SESSION__RESOLUTION=\"latest-request-wins\"");
    println!("  export BOOK_SEARCH_LOADING__MIN_DISPLAY_MS=\"0\"");
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("book_search={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = resolve_format(cli.output);

    match cli.command {
        Some(Commands::Config { command }) => run_config_command(command, &config, cli.quiet),

        Some(Commands::Search { query, open }) => {
            let catalog = GoogleBooksCatalog::from_config(&config.catalog)?;
            let handle = new_session(&config, format, cli.quiet);

            handle.set_query(query);
            let outcome = run_search(&handle, &catalog, cli.quiet, format).await;
            if let SearchOutcome::Failed(err) = outcome {
                anyhow::bail!("Search failed: {}", err);
            }

            // Results are printed even when --open points past the end
            let selected = open.map(|n| handle.select_index(n - 1)).transpose();
            output_session(&handle.snapshot(), format, open.is_some());
            selected?;
            Ok(())
        }

        Some(Commands::Interactive) | None => {
            let catalog: Arc<dyn Catalog> =
                Arc::new(GoogleBooksCatalog::from_config(&config.catalog)?);
            let handle = new_session(&config, OutputFormat::Table, cli.quiet);
            run_prompt(&handle, catalog, cli.quiet).await
        }
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

/// The minimum display time only matters while a busy indicator is on screen.
fn new_session(config: &Config, format: OutputFormat, quiet: bool) -> SessionHandle {
    let loading = if quiet || format != OutputFormat::Table {
        LoadingPolicy::immediate()
    } else {
        config.loading.policy()
    };
    SessionHandle::new(SearchSession::with_policy(config.session.resolution), loading)
}

async fn run_search(
    handle: &SessionHandle,
    catalog: &dyn Catalog,
    quiet: bool,
    format: OutputFormat,
) -> SearchOutcome {
    let query = handle.with(|s| s.query().to_string());
    let spinner = if quiet || format != OutputFormat::Table {
        Spinner::hidden()
    } else {
        Spinner::new(&format!("Searching {} for \"{}\"...", catalog.name(), query))
    };

    let start = Instant::now();
    let outcome = handle.submit(catalog).await;

    match &outcome {
        SearchOutcome::Applied { .. } => {
            spinner.clear();
            if format == OutputFormat::Table && !quiet {
                let (count, total) = handle.with(|s| (s.results().len(), s.total_results()));
                ui::print_search_header(&query, count, total, start.elapsed());
            }
        }
        SearchOutcome::Discarded => spinner.clear(),
        SearchOutcome::Failed(err) => spinner.finish_with_error(&format!("Search failed: {}", err)),
    }

    outcome
}

/// A prompt search that has resolved
#[derive(Debug)]
struct FinishedSearch {
    seq: u64,
    query: String,
    outcome: SearchOutcome,
    elapsed: Duration,
}

/// Start a search for `text` in the background; its outcome arrives on `done`.
fn spawn_search(
    handle: &SessionHandle,
    catalog: &Arc<dyn Catalog>,
    text: String,
    done: &mpsc::UnboundedSender<FinishedSearch>,
) -> u64 {
    let pending = handle.start_query(text);
    let seq = pending.seq();
    let query = pending.query().to_string();
    let catalog = Arc::clone(catalog);
    let done = done.clone();

    tokio::spawn(async move {
        let start = Instant::now();
        let outcome = pending.run(catalog.as_ref()).await;
        // The prompt may have exited already
        let _ = done.send(FinishedSearch {
            seq,
            query,
            outcome,
            elapsed: start.elapsed(),
        });
    });

    seq
}

fn print_prompt(handle: &SessionHandle) -> std::io::Result<()> {
    match handle.in_flight() {
        0 => print!("› "),
        n => print!("[searching: {}] › ", n),
    }
    std::io::stdout().flush()
}

/// Interactive loop. Input keeps being read while searches are in flight.
async fn run_prompt(handle: &SessionHandle, catalog: Arc<dyn Catalog>, quiet: bool) -> Result<()> {
    if !quiet {
        ui::print_banner();
    }

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt(handle)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match PromptCommand::parse(&line) {
                    PromptCommand::Search(text) => {
                        let seq = spawn_search(handle, &catalog, text, &done_tx);
                        tracing::debug!(ticket = seq, "Search submitted from prompt");
                        if !quiet {
                            ui::print_status(Status::Search, &format!("Searching {}...", catalog.name()));
                        }
                    }
                    PromptCommand::Open(n) => match handle.select_index(n - 1) {
                        Ok(volume) => ui::print_detail(&VolumeDetail::from_volume(&volume)),
                        Err(err) => ui::print_status(Status::Warning, &err.to_string()),
                    },
                    PromptCommand::Close => handle.close_detail(),
                    PromptCommand::Results => print_cards(handle),
                    PromptCommand::Help => ui::print_help(),
                    PromptCommand::Quit => break,
                    PromptCommand::Invalid(msg) => ui::print_status(Status::Warning, &msg),
                }
            }
            Some(finished) = done_rx.recv() => report_search(handle, finished, quiet),
        }

        print_prompt(handle)?;
    }

    Ok(())
}

fn report_search(handle: &SessionHandle, finished: FinishedSearch, quiet: bool) {
    match finished.outcome {
        SearchOutcome::Applied { count } => {
            if !quiet {
                let total = handle.with(|s| s.total_results());
                ui::print_search_header(&finished.query, count, total, finished.elapsed);
            }
            print_cards(handle);
        }
        SearchOutcome::Discarded => {
            tracing::debug!(ticket = finished.seq, "Prompt search superseded");
            if !quiet {
                ui::print_status(
                    Status::Info,
                    &format!("Results for \"{}\" were superseded by a newer search", finished.query),
                );
            }
        }
        SearchOutcome::Failed(err) => ui::print_status(
            Status::Error,
            &format!("Search for \"{}\" failed: {}", finished.query, err),
        ),
    }
}

fn print_cards(handle: &SessionHandle) {
    let cards: Vec<VolumeCard> =
        handle.with(|s| s.results().iter().map(VolumeCard::from_volume).collect());
    ui::print_cards(&cards);
}

fn run_config_command(command: ConfigCommands, config: &Config, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Init { path, force } => {
            let path = path
                .or_else(default_config_path)
                .context("No configuration directory on this platform; pass --path")?;

            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }

            ConfigFile::save(&Config::default(), &path)?;
            if !quiet {
                ui::print_status(
                    Status::Success,
                    &format!("Wrote default configuration to {}", path.display()),
                );
            }
            Ok(())
        }
        ConfigCommands::Show => {
            print!("{}", ConfigFile::render(config)?);
            Ok(())
        }
    }
}

fn output_session(session: &SearchSession, format: OutputFormat, show_detail: bool) {
    let cards: Vec<VolumeCard> = session.results().iter().map(VolumeCard::from_volume).collect();
    let detail = if show_detail {
        VolumeDetail::for_selection(session.selection())
    } else {
        None
    };

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&SessionView::of(session)) {
            Ok(json) => println!("{}", json),
            Err(err) => ui::print_status(Status::Error, &format!("Failed to encode JSON: {}", err)),
        },
        OutputFormat::Plain => {
            for (i, card) in cards.iter().enumerate() {
                println!("{}. {}", i + 1, card.title);
                println!("  Author(s): {}", card.authors);
                println!("  Publisher: {}", card.publisher);
                println!("  Cover: {}", card.image);
                for action in &card.actions {
                    println!("  {}: {}", action.label(), action.url());
                }
                println!();
            }
            if let Some(detail) = &detail {
                for line in ui::detail_lines(detail, usize::MAX) {
                    println!("{}", line);
                }
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            ui::print_cards(&cards);
            if let Some(detail) = &detail {
                ui::print_detail(detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["book-search"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["book-search", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["book-search", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_output_format() {
        let cli = Cli::parse_from(["book-search", "-o", "json"]);
        assert_eq!(cli.output, OutputFormat::Json);

        let cli = Cli::parse_from(["book-search", "--output", "plain"]);
        assert_eq!(cli.output, OutputFormat::Plain);
    }

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::parse_from(["book-search", "search", "dune", "--open", "1"]);
        match &cli.command {
            Some(Commands::Search { query, open }) => {
                assert_eq!(query, "dune");
                assert_eq!(*open, Some(1));
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_alias_and_empty_query() {
        let cli = Cli::parse_from(["book-search", "s", ""]);
        match &cli.command {
            Some(Commands::Search { query, open }) => {
                assert_eq!(query, "");
                assert!(open.is_none());
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from(["book-search", "config", "init", "--path", "/tmp/bs.toml", "-f"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Init { path, force },
            }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/bs.toml")));
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["book-search", "search", "dune", "-q", "--config", "x.toml"]);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_open_must_be_one_based() {
        assert!(Cli::try_parse_from(["book-search", "search", "dune", "--open", "0"]).is_err());
        assert!(Cli::try_parse_from(["book-search", "search", "dune", "--open", "two"]).is_err());
        assert!(Cli::try_parse_from(["book-search", "search", "dune", "--open", "2"]).is_ok());
    }

    #[test]
    fn test_parse_result_number() {
        assert_eq!(parse_result_number("3"), Ok(3));
        assert!(parse_result_number("0").is_err());
        assert!(parse_result_number("-1").is_err());
    }

    #[tokio::test]
    async fn test_prompt_searches_run_in_background() {
        use book_search::catalog::mock::make_volume;
        use book_search::catalog::MockCatalog;

        let mock = Arc::new(MockCatalog::new());
        mock.set_volumes("dune", vec![make_volume("d", "Dune")]);
        mock.set_volumes("emma", vec![make_volume("e", "Emma")]);
        let catalog: Arc<dyn Catalog> = mock.clone();
        let handle = SessionHandle::default();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        spawn_search(&handle, &catalog, "dune".to_string(), &done_tx);
        let first = done_rx.recv().await.unwrap();
        assert_eq!(first.outcome, SearchOutcome::Applied { count: 1 });

        // A held search leaves the session usable and open to another submit
        let release = mock.hold("emma");
        let seq = spawn_search(&handle, &catalog, "emma".to_string(), &done_tx);
        assert!(handle.is_busy());
        assert_eq!(handle.select_index(0).unwrap().id, "d");
        handle.close_detail();

        let again = spawn_search(&handle, &catalog, "dune".to_string(), &done_tx);
        assert!(again > seq);
        assert_eq!(handle.in_flight(), 2);

        let finished = done_rx.recv().await.unwrap();
        assert_eq!(finished.query, "dune");

        release.send(()).unwrap();
        let finished = done_rx.recv().await.unwrap();
        assert_eq!(finished.seq, seq);
        assert_eq!(finished.query, "emma");
        assert_eq!(finished.outcome, SearchOutcome::Applied { count: 1 });
        assert!(!handle.is_busy());
        assert_eq!(mock.calls(), 3);
    }

    #[test]
    fn test_prompt_command_parse() {
        assert_eq!(PromptCommand::parse("dune"), PromptCommand::Search("dune".into()));
        assert_eq!(PromptCommand::parse(""), PromptCommand::Search(String::new()));
        assert_eq!(PromptCommand::parse(":open 3"), PromptCommand::Open(3));
        assert_eq!(PromptCommand::parse(" :o 1 "), PromptCommand::Open(1));
        assert_eq!(PromptCommand::parse(":close"), PromptCommand::Close);
        assert_eq!(PromptCommand::parse(":results"), PromptCommand::Results);
        assert_eq!(PromptCommand::parse(":help"), PromptCommand::Help);
        assert_eq!(PromptCommand::parse(":quit"), PromptCommand::Quit);
    }

    #[test]
    fn test_prompt_command_invalid() {
        assert!(matches!(PromptCommand::parse(":open"), PromptCommand::Invalid(_)));
        assert!(matches!(PromptCommand::parse(":open 0"), PromptCommand::Invalid(_)));
        assert!(matches!(PromptCommand::parse(":open x"), PromptCommand::Invalid(_)));
        assert!(matches!(PromptCommand::parse(":frobnicate"), PromptCommand::Invalid(_)));
    }

    #[test]
    fn test_session_view_json() {
        let mut session = SearchSession::new();
        session.set_query("dune");
        let ticket = session.begin_search();
        session.complete_search(
            ticket,
            Ok(book_search::models::SearchResponse::new(
                vec![book_search::Volume::new("1", "Dune")],
                "dune",
            )),
        );
        session.select_index(0).unwrap();

        let json = serde_json::to_value(SessionView::of(&session)).unwrap();
        assert_eq!(json["query"], "dune");
        assert_eq!(json["results"][0]["authors"], "Unknown");
        assert_eq!(json["selection"]["published_date"], "DD-MM-YYYY");
    }
}
