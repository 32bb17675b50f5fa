// src/crawl/crawler.rs
// =============================================================================
// This module walks the document graph starting from a seed URL.
//
// How it works:
// 1. Start with the seed URL on a stack at depth 0
// 2. Pop a URL; skip it if already visited, too deep, or the document cap
//    has been reached
// 3. Fetch it; on success record it, emit a progress event and push every
//    link it contains at depth + 1
// 4. Repeat until the stack is empty or the cap is reached
//
// Links are pushed in reverse so the first link is popped first: the visit
// order is the same depth-first order a recursive visit(url, depth) would
// produce.
//
// Failures:
// - A failed fetch is logged, recorded and announced, then the branch is
//   dropped. The URL is NOT marked visited, so another parent can lead to it
//   again and it will be refetched.
// - Only a failure on the seed itself aborts the crawl.
//
// Rust concepts:
// - Vec as a stack: push/pop from the end gives depth-first order
// - HashSet: O(1) "already fetched?" checks
// - &dyn DocumentFetcher: the crawler works with any fetcher (HTTP or in-memory)
// =============================================================================

use super::{CrawlError, CrawlLimits, CrawlResult, Document, FailedFetch};
use crate::events::EventLog;
use crate::extract::{extract_links, is_valid_url};
use crate::fetch::DocumentFetcher;
use tracing::{debug, info, warn};

// A URL waiting on the stack
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize, // Link hops from the seed
}

/// Runs bounded crawls against one fetcher, reporting progress to an event log.
///
/// Holds no per-crawl state: every call to [`Crawler::crawl`] owns its own
/// visited set and result list, so one crawler can serve concurrent crawls.
pub struct Crawler<'a> {
    fetcher: &'a dyn DocumentFetcher,
    events: &'a EventLog,
    limits: CrawlLimits,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher, events: &'a EventLog, limits: CrawlLimits) -> Self {
        Self {
            fetcher,
            events,
            limits,
        }
    }

    // Crawls outward from `seed_url`
    //
    // Returns: documents in fetch order (seed first), the visited set and the
    // list of failed fetches.
    //
    // Errors (nothing is fetched for the first three):
    //   EmptySeed / InvalidSeed  - the seed is blank or not an absolute URL
    //   ZeroDocumentLimit        - max_documents is 0
    //   SeedUnreachable          - the seed document itself could not be fetched
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlResult, CrawlError> {
        let seed = seed_url.trim();
        if seed.is_empty() {
            return Err(CrawlError::EmptySeed);
        }
        if !is_valid_url(seed) {
            return Err(CrawlError::InvalidSeed(seed.to_string()));
        }
        if self.limits.max_documents == 0 {
            return Err(CrawlError::ZeroDocumentLimit);
        }

        let mut result = CrawlResult::default();
        let mut stack = vec![CrawlItem {
            url: seed.to_string(),
            depth: 0,
        }];

        // pop() takes the most recently pushed item (depth-first)
        while let Some(item) = stack.pop() {
            // The cap is checked before fetching, so we never fetch one too many
            if result.documents.len() >= self.limits.max_documents {
                debug!(max = self.limits.max_documents, "document limit reached, stopping crawl");
                break;
            }
            // Reached through another parent since it was pushed
            if result.visited.contains(&item.url) {
                continue;
            }
            if item.depth > self.limits.max_depth {
                debug!(url = %item.url, depth = item.depth, "beyond max depth, skipping");
                continue;
            }

            match self.fetcher.fetch(&item.url).await {
                Ok(content) => {
                    info!(url = %item.url, depth = item.depth, "obtained document");
                    self.events
                        .append(format!("crawled {} (depth {})", item.url, item.depth));

                    result.visited.insert(item.url.clone());

                    // Only look for children if they would still be within range
                    if item.depth < self.limits.max_depth {
                        let links = extract_links(&content);
                        for link in links.into_iter().rev() {
                            if !result.visited.contains(&link) {
                                stack.push(CrawlItem {
                                    url: link,
                                    depth: item.depth + 1,
                                });
                            }
                        }
                    }

                    result.documents.push(Document::fetched(item.url, content));
                }
                Err(e) if item.depth == 0 => {
                    warn!(url = %item.url, error = %e, "failed to fetch seed document");
                    self.events
                        .append(format!("failed to fetch seed {}: {}", item.url, e));
                    return Err(CrawlError::SeedUnreachable {
                        url: item.url,
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(url = %item.url, depth = item.depth, error = %e, "failed to fetch document");
                    self.events
                        .append(format!("failed to fetch {}: {}", item.url, e));
                    result.failures.push(FailedFetch {
                        url: item.url,
                        depth: item.depth,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }
}
