// src/extract/mod.rs
// =============================================================================
// Link discovery inside parsed documents.
//
// Submodules:
// - links: walks a JSON value and collects URLs stored under link-bearing keys
// =============================================================================

mod links;

pub use links::{extract_links, is_valid_url};
