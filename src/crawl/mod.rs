// src/crawl/mod.rs
// =============================================================================
// This module handles crawling agent description documents.
//
// Features:
// - Depth-first traversal starting from a seed URL
// - Hard ceilings on link depth and document count, checked before any fetch
// - Visited-set deduplication (each URL fetched successfully at most once)
// - Non-fatal fetch failures, reported through the event log
//
// The types here are what a crawl hands back to its caller; the traversal
// itself lives in crawler.rs.
// =============================================================================

mod crawler;

use crate::fetch::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

pub use crawler::Crawler;

/// A fetched document. Never modified after the fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// URL the document was fetched from
    pub url: String,
    /// HTTP method used (always GET for crawled documents)
    pub method: String,
    /// Parsed content
    pub content: Value,
}

impl Document {
    pub fn fetched(url: impl Into<String>, content: Value) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            content,
        }
    }
}

/// A URL the crawl reached but could not fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFetch {
    pub url: String,
    pub depth: usize,
    pub reason: String,
}

/// Everything one crawl produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Documents in fetch order; index 0 is the seed
    pub documents: Vec<Document>,
    /// URLs fetched successfully (same size as `documents`)
    pub visited: HashSet<String>,
    /// Fetches that failed, in the order they were attempted
    pub failures: Vec<FailedFetch>,
}

impl CrawlResult {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Visited URLs in fetch order.
    pub fn visited_urls(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.url.clone()).collect()
    }
}

/// Hard ceilings for one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum number of link hops from the seed (0 = seed only)
    pub max_depth: usize,
    /// Maximum number of documents fetched (must be > 0)
    pub max_documents: usize,
}

/// Request-level crawl failures. Failures past the seed never show up here.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("seed URL cannot be empty")]
    EmptySeed,
    #[error("seed URL '{0}' is not an absolute URL")]
    InvalidSeed(String),
    #[error("max_documents must be greater than zero")]
    ZeroDocumentLimit,
    #[error("failed to fetch seed document {url}: {source}")]
    SeedUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },
}

impl CrawlError {
    /// True when the caller sent bad input (as opposed to the seed being unreachable).
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, CrawlError::SeedUnreachable { .. })
    }
}
