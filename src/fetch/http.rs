// src/fetch/http.rs
// =============================================================================
// The default DocumentFetcher: plain HTTP GET with reqwest.
//
// What it does:
// - Reuses one reqwest Client (connection pooling) for every fetch
// - Applies a per-request timeout so a slow agent can't stall a crawl forever
// - Optionally sends a fixed Authorization header
// - Decodes the body into a JSON value based on the content type
//
// Body decoding:
// - JSON / JSON-LD         -> parsed JSON value (malformed body = failed fetch)
// - YAML (OpenAPI specs)   -> parsed into the same JSON value model
// - anything else          -> JSON if it parses, else a string of the raw text
//
// Status handling:
// - 404                    -> FetchError::NotFound
// - any other non-2xx      -> FetchError::Status
// =============================================================================

use super::{DocumentFetcher, FetchError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const ACCEPT_DOCUMENTS: &str =
    "application/ld+json, application/json;q=0.9, application/yaml;q=0.8, */*;q=0.5";

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Raw Authorization header value, e.g. "Bearer abc"
    pub auth_header: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("agent-explorer/", env!("CARGO_PKG_VERSION")).to_string(),
            auth_header: None,
        }
    }
}

/// Fetches documents over HTTP. Cheap to clone (the client is reference counted).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    auth_header: Option<String>,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            auth_header: options.auth_header.clone(),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let target = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let path = target.path().to_string();

        let mut request = self.client.get(target).header(ACCEPT, ACCEPT_DOCUMENTS);
        if let Some(value) = &self.auth_header {
            request = request.header(AUTHORIZATION, value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = response.text().await?;
        debug!(url, content_type = %content_type, bytes = body.len(), "fetched body");

        decode_body(&body, &content_type, &path)
    }
}

// Turns a response body into a JSON value
//
// A body whose content type names JSON or YAML must parse as that format,
// otherwise the fetch fails. Bodies with any other content type never fail:
// they are tried as YAML (for .yaml/.yml paths) and JSON, and kept as a raw
// string when neither works.
fn decode_body(body: &str, content_type: &str, path: &str) -> Result<Value, FetchError> {
    if content_type.contains("json") {
        return serde_json::from_str(body).map_err(|e| FetchError::Parse {
            format: "JSON",
            reason: e.to_string(),
        });
    }

    if content_type.contains("yaml") {
        return serde_yaml::from_str(body).map_err(|e| FetchError::Parse {
            format: "YAML",
            reason: e.to_string(),
        });
    }

    if path.ends_with(".yaml") || path.ends_with(".yml") {
        if let Ok(value) = serde_yaml::from_str::<Value>(body) {
            return Ok(value);
        }
    }

    // Plenty of agents serve JSON as text/plain
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    Ok(Value::String(body.to_string()))
}
