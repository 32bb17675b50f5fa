// src/fetch/mod.rs
// =============================================================================
// This module defines how documents are retrieved.
//
// The crawler never talks HTTP directly. It only knows the DocumentFetcher
// trait: give it a URL, get back parsed content or an error. That keeps the
// crawl logic testable with an in-memory fetcher and lets the transport
// (authentication, timeouts, content negotiation) live in one place.
//
// Submodules:
// - http: the default reqwest-backed fetcher
// =============================================================================

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub use http::{FetchOptions, HttpFetcher};

/// Why a document could not be retrieved.
///
/// The crawler treats every variant the same way (skip the branch); the
/// variants only exist so logs and the get-document endpoint can say what
/// went wrong.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: DNS, connect, timeout, TLS, body read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    /// The URL could not be parsed
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
    /// Nothing lives at this URL (HTTP 404, or absent from an in-memory fetcher)
    #[error("no document at {0}")]
    NotFound(String),
    /// The body was declared as JSON or YAML but didn't parse as such
    #[error("malformed {format} body: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },
}

// The capability the crawler needs: URL in, parsed document out
//
// Implementations must be shareable across tasks (Send + Sync) because the
// HTTP server hands one fetcher to every concurrent request.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieves and parses the document at `url`.
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Outcome of looking up one document outside a crawl.
///
/// Failure is reported in-band (`success: false`) rather than as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLookup {
    pub url: String,
    pub content: Option<Value>,
    pub success: bool,
    pub message: String,
}

// Fetches a single document and wraps the outcome for display
pub async fn lookup_document(fetcher: &dyn DocumentFetcher, url: &str) -> DocumentLookup {
    match fetcher.fetch(url).await {
        Ok(content) => DocumentLookup {
            url: url.to_string(),
            content: Some(content),
            success: true,
            message: "Successfully retrieved document".to_string(),
        },
        Err(e) => {
            warn!(url, error = %e, "document lookup failed");
            DocumentLookup {
                url: url.to_string(),
                content: None,
                success: false,
                message: format!("Failed to get document: {}", e),
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory fetcher for tests.

    use super::{DocumentFetcher, FetchError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves documents from a map and records every URL it was asked for.
    #[derive(Default)]
    pub struct StaticFetcher {
        documents: HashMap<String, Value>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, content: Value) -> Self {
            self.documents.insert(url.to_string(), content);
            self
        }

        /// Every URL passed to `fetch`, in call order (failures included).
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(url.to_string()))
        }
    }
}
