use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store_search::output::{OutputFormat, write_snapshot};
use store_search::{
    CatalogExecutor, ResultSnapshot, SearchQuery, SearchScope, SearchSession, SearchStatus,
    SessionConfig, telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "store-search",
    version,
    about = "Debounced, cancellable search across the storefront's media scopes",
    long_about = None
)]
struct Cli {
    /// Search term. Without it, query changes are read line by line from stdin
    query: Option<String>,

    /// Catalog file to search (default: <data dir>/store-search/catalog.json)
    #[arg(short, long, env = "STORE_SEARCH_CATALOG")]
    catalog: Option<PathBuf>,

    /// Session config file (default: <config dir>/store-search/config.json)
    #[arg(long, env = "STORE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Scope to search: all, movies, music, apps or books
    #[arg(short, long, default_value = "all")]
    scope: SearchScope,

    /// Quiet period before a query change starts a search
    #[arg(long, env = "STORE_SEARCH_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Simulated provider latency per scope request
    #[arg(long, env = "STORE_SEARCH_LATENCY_MS", default_value = "0")]
    latency_ms: u64,

    /// Per-scope request timeout
    #[arg(long, env = "STORE_SEARCH_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Locale sent as the `lang` request parameter
    #[arg(long, env = "STORE_SEARCH_LOCALE")]
    locale: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing(cli.verbose, cli.log_json);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = build_config(&cli)?;
    let catalog_path = cli
        .catalog
        .clone()
        .or_else(default_catalog_path)
        .ok_or_else(|| anyhow!("No catalog given and no data directory found (use --catalog)"))?;

    let executor = CatalogExecutor::load(&catalog_path)
        .await
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?
        .with_latency(Duration::from_millis(cli.latency_ms));
    info!(entries = executor.len(), catalog = %catalog_path.display(), "catalog loaded");

    let session = SearchSession::new(Arc::new(executor), config);
    let use_color = !cli.no_color;

    let outcome = match cli.query.as_deref() {
        Some(query) => run_once(&session, query, cli.scope, cli.format, use_color).await,
        None => run_interactive(&session, cli.scope, cli.format, use_color).await,
    };

    session.shutdown().await;
    outcome
}

fn build_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::load_default()?,
    };
    if let Some(debounce_ms) = cli.debounce_ms {
        config = config.with_debounce_ms(debounce_ms);
    }
    if let Some(locale) = &cli.locale {
        config = config.with_locale(locale.clone());
    }
    if cli.timeout_ms.is_some() {
        config = config.with_request_timeout_ms(cli.timeout_ms);
    }
    Ok(config)
}

fn default_catalog_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("store-search").join("catalog.json"))
}

/// One search: wait until every scope has answered, then print the final snapshot.
async fn run_once(
    session: &SearchSession,
    term: &str,
    scope: SearchScope,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let query = SearchQuery::new(term, scope);
    if query.is_empty() {
        bail!("Query must not be empty");
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Searching {query}"));
    {
        let spinner = spinner.clone();
        session.on_snapshot_changed(move |snapshot, _| {
            spinner.set_message(format!("{} results so far", snapshot.len()));
        });
    }

    let start = Instant::now();
    let mut status = session.status();
    session.on_query_changed(query.term, query.scope);
    status
        .wait_for(|status| matches!(status, SearchStatus::Completed(_)))
        .await
        .context("Search session stopped before the search completed")?;
    spinner.finish_and_clear();

    let snapshot = session.current_snapshot();
    print_snapshot(&snapshot, format, use_color, Some(start.elapsed()))?;
    Ok(())
}

/// A line typed in interactive mode.
#[derive(Debug, PartialEq, Eq)]
enum InputLine<'a> {
    Term(&'a str),
    Scope(&'a str),
    Quit,
}

fn parse_input(line: &str) -> InputLine<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.trim() {
        ":quit" | ":q" => InputLine::Quit,
        command if command.starts_with(":scope") => {
            InputLine::Scope(command.trim_start_matches(":scope").trim())
        }
        _ => InputLine::Term(line),
    }
}

/// Every stdin line is a query change; every published snapshot is printed as
/// it arrives.
async fn run_interactive(
    session: &SearchSession,
    mut scope: SearchScope,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    eprintln!("Type a query. ':scope <name>' changes scope, an empty line clears, ':quit' exits.");

    let mut snapshots = session.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Err(e) = print_snapshot(&snapshot, format, use_color, None) {
                warn!(error = %e, "failed to write snapshot");
                break;
            }
        }
    });

    let mut term = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            InputLine::Quit => break,
            InputLine::Scope(name) => match name.parse::<SearchScope>() {
                Ok(parsed) => {
                    scope = parsed;
                    session.on_query_changed(term.clone(), scope);
                }
                Err(e) => eprintln!("{e}"),
            },
            InputLine::Term(typed) => {
                term = typed.to_string();
                session.on_query_changed(term.clone(), scope);
            }
        }
    }

    printer.abort();
    Ok(())
}

fn print_snapshot(
    snapshot: &ResultSnapshot,
    format: OutputFormat,
    use_color: bool,
    elapsed: Option<Duration>,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_snapshot(&mut handle, snapshot, format, use_color, elapsed)?;
    handle.flush()
}
