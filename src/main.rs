// src/main.rs
// =============================================================================
// This is the entry point of the agent-explorer binary.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = some documents failed, 2 = error)
//
// Rust concepts used:
// - async/await: every fetch is a network call, so handlers are async
// - Arc<dyn Trait>: the server shares one fetcher across all requests
// - Result<T, E> with ?: errors bubble up to run(), which turns them into exit code 2
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod crawl;    // src/crawl/ - bounded traversal of linked documents
mod events;   // src/events/ - progress log and live subscriptions
mod extract;  // src/extract/ - link discovery in JSON documents
mod fetch;    // src/fetch/ - document retrieval
mod logging;  // src/logging.rs - tracing subscriber setup
mod server;   // src/server/ - HTTP API
mod tree;     // src/tree/ - document hierarchy reconstruction

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, FetchArgs, ServeArgs, TreeArgs};
use crawl::{CrawlLimits, Crawler};
use events::{EventLog, EventStreamer};
use fetch::{lookup_document, DocumentFetcher, HttpFetcher};
use server::{AppState, ServerSettings};
use std::sync::Arc;
use tree::{render_tree, DocTreeReport};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = everything fetched
//   Ok(1) = the crawl finished but some documents could not be fetched
//   Err   = the command could not run (exit code 2)
async fn run() -> Result<i32> {
    // Handles --help and --version on its own and exits
    let cli = Cli::parse();

    // Logs go to stderr, so this is safe to do before printing anything
    logging::init();

    match cli.command {
        Commands::Tree(args) => handle_tree(args).await,
        Commands::Fetch { url, json, fetch } => handle_fetch(&url, json, &fetch).await,
        Commands::Serve(args) => handle_serve(args).await,
    }
}

// Handles the 'tree' subcommand
//
// The crawl gets its own event log here; nothing subscribes to it, the
// messages only mirror what the tracing output already shows.
async fn handle_tree(args: TreeArgs) -> Result<i32> {
    let fetcher = HttpFetcher::new(&args.fetch.options())?;
    let events = EventLog::new();
    let limits = CrawlLimits::from(&args.limits);

    if !args.json {
        println!("🔍 Crawling agent: {}", args.agent_url);
        println!(
            "📊 Max depth: {}, max documents: {}",
            limits.max_depth, limits.max_documents
        );
    }

    let result = Crawler::new(&fetcher, &events, limits)
        .crawl(&args.agent_url)
        .await?;
    let report = DocTreeReport::from_crawl(result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print!("{}", render_tree(&report.doc_tree));
        print_summary(&report);
    }

    if report.failed_fetches.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn print_summary(report: &DocTreeReport) {
    println!();
    println!("📊 Summary:");
    println!("   📄 Documents: {}", report.crawled_documents.len());
    println!("   ❌ Failed: {}", report.failed_fetches.len());
    for failure in &report.failed_fetches {
        println!("      {} (depth {}): {}", failure.url, failure.depth, failure.reason);
    }
}

// Handles the 'fetch' subcommand
async fn handle_fetch(url: &str, json: bool, fetch: &FetchArgs) -> Result<i32> {
    let fetcher = HttpFetcher::new(&fetch.options())?;
    let lookup = lookup_document(&fetcher, url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&lookup)?);
    } else if let Some(content) = &lookup.content {
        println!("{}", serde_json::to_string_pretty(content)?);
    } else {
        eprintln!("❌ {}", lookup.message);
    }

    Ok(if lookup.success { 0 } else { 1 })
}

// Handles the 'serve' subcommand
async fn handle_serve(args: ServeArgs) -> Result<i32> {
    // Arc<dyn DocumentFetcher>: one client, shared by every request handler
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(HttpFetcher::new(&args.fetch.options())?);
    let events = match args.event_capacity {
        Some(capacity) => EventLog::with_capacity(capacity),
        None => EventLog::new(),
    };
    // `events.clone()` copies the handle, not the log: both point at the same entries
    let (streamer, shutdown) = EventStreamer::new(events.clone(), args.poll_interval());

    let state = AppState {
        fetcher,
        events,
        streamer,
        settings: Arc::new(ServerSettings {
            default_agent_url: args.default_agent_url.clone(),
            limits: CrawlLimits::from(&args.limits),
        }),
    };

    server::serve(&args.host, args.port, state, shutdown).await?;
    Ok(0)
}
