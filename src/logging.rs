// src/logging.rs
// =============================================================================
// Diagnostic logging setup.
//
// Logs go to stderr so `tree --json` and `fetch --json` keep stdout clean for
// piping. The level comes from RUST_LOG when it is set, e.g.
//
//   RUST_LOG=agent_explorer=trace,tower_http=debug agent-explorer serve
// =============================================================================

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,agent_explorer=debug";

// Installs the global subscriber
//
// Safe to call more than once: later calls are ignored, which keeps tests
// that go through `run()` from panicking.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
