// src/events/mod.rs
// =============================================================================
// Crawl progress as a live feed.
//
// Submodules:
// - log: the shared, append-only list of progress messages
// - stream: per-subscriber polling cursors over that list
//
// Producers (crawls, request handlers) only ever call EventLog::append.
// Consumers (the SSE endpoint) only ever call EventStreamer::subscribe.
// =============================================================================

mod log;
mod stream;

pub use log::EventLog;
pub use stream::{EventStreamer, ShutdownHandle, DEFAULT_POLL_INTERVAL};
