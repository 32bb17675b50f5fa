// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - tree:  crawl from an agent URL and print the document tree
// - fetch: fetch one document and print it
// - serve: run the HTTP API (tree query, document lookup, live events)
//
// Every flag can also come from the environment (PORT or AGENT_EXPLORER_*),
// which is how the server is usually configured. The bind address uses
// AGENT_EXPLORER_HOST rather than HOST: many shells export HOST as the
// machine's hostname.
// =============================================================================

use crate::crawl::CrawlLimits;
use crate::events::DEFAULT_POLL_INTERVAL;
use crate::fetch::FetchOptions;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

/// Agent used when none is given to `serve` requests.
pub const DEFAULT_AGENT_URL: &str = "https://agent-search.ai/ad.json";

#[derive(Parser, Debug)]
#[command(
    name = "agent-explorer",
    version,
    about = "Crawl agent description documents and rebuild their hierarchy",
    long_about = "agent-explorer follows the links inside JSON-LD agent descriptions \
                  (@id, url, serviceEndpoint), rebuilds the document hierarchy from what \
                  it fetched, and can serve both the tree and live crawl progress over HTTP."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from an agent description and print the document tree
    ///
    /// Example: agent-explorer tree https://agent-search.ai/ad.json --max-depth 2
    Tree(TreeArgs),

    /// Fetch a single document and print its content
    ///
    /// Example: agent-explorer fetch https://agent-search.ai/ad.json
    Fetch {
        /// Document URL
        url: String,

        /// Print the lookup result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Agent description URL to start from
    pub agent_url: String,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// Print the full report (tree, visited URLs, documents) as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "AGENT_EXPLORER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Seed used when a tree request has no agent_url
    #[arg(long, env = "AGENT_EXPLORER_DEFAULT_AGENT_URL", default_value = DEFAULT_AGENT_URL)]
    pub default_agent_url: String,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// Milliseconds between two event deliveries to a subscriber
    #[arg(
        long,
        env = "AGENT_EXPLORER_POLL_INTERVAL_MS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64
    )]
    pub poll_interval_ms: u64,

    /// Keep only the newest N progress events (unbounded when omitted)
    #[arg(long, env = "AGENT_EXPLORER_EVENT_CAPACITY")]
    pub event_capacity: Option<usize>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl ServeArgs {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Crawl bounds shared by `tree` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct LimitArgs {
    /// Link hops to follow from the seed (0 = seed only)
    #[arg(long, env = "AGENT_EXPLORER_MAX_DEPTH", default_value_t = 4)]
    pub max_depth: usize,

    /// Stop after this many documents
    #[arg(
        long,
        env = "AGENT_EXPLORER_MAX_DOCUMENTS",
        default_value_t = 30,
        value_parser = parse_document_limit
    )]
    pub max_documents: usize,
}

// Document limit must be at least 1
fn parse_document_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl From<&LimitArgs> for CrawlLimits {
    fn from(args: &LimitArgs) -> Self {
        CrawlLimits {
            max_depth: args.max_depth,
            max_documents: args.max_documents,
        }
    }
}

/// HTTP options for the document fetcher.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Per-request timeout in seconds
    #[arg(long, env = "AGENT_EXPLORER_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// User-Agent header
    #[arg(long, env = "AGENT_EXPLORER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Raw Authorization header value sent with every fetch
    #[arg(long, env = "AGENT_EXPLORER_AUTH_HEADER", hide_env_values = true)]
    pub auth_header: Option<String>,
}

impl FetchArgs {
    pub fn options(&self) -> FetchOptions {
        let defaults = FetchOptions::default();
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            auth_header: self.auth_header.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tree_with_limits() {
        let cli = Cli::try_parse_from([
            "agent-explorer",
            "tree",
            "https://agent-search.ai/ad.json",
            "--max-depth",
            "2",
            "--max-documents",
            "5",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Tree(args) => {
                assert_eq!(args.agent_url, "https://agent-search.ai/ad.json");
                assert_eq!(
                    CrawlLimits::from(&args.limits),
                    CrawlLimits {
                        max_depth: 2,
                        max_documents: 5
                    }
                );
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_max_documents_is_rejected() {
        let parsed = Cli::try_parse_from([
            "agent-explorer",
            "tree",
            "https://agent-search.ai/ad.json",
            "--max-documents",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["agent-explorer", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 8080);
                assert_eq!(args.default_agent_url, DEFAULT_AGENT_URL);
                assert_eq!(args.poll_interval(), DEFAULT_POLL_INTERVAL);
                assert!(args.event_capacity.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_args_to_options() {
        let args = FetchArgs {
            timeout_secs: 3,
            user_agent: None,
            auth_header: Some("Bearer t".to_string()),
        };
        let options = args.options();
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert!(options.user_agent.starts_with("agent-explorer/"));
        assert_eq!(options.auth_header.as_deref(), Some("Bearer t"));
    }
}
