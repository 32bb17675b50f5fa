// src/server/routes.rs
// =============================================================================
// Request handlers.
//
// POST /api/agent-doc-tree   crawl from an agent URL and return the tree
// POST /api/get-document     fetch a single document
// GET  /api/events           live crawl progress as Server-Sent Events
// GET  /health               liveness probe
// =============================================================================

use super::error::AppError;
use super::AppState;
use crate::crawl::Crawler;
use crate::fetch::{lookup_document, DocumentLookup};
use crate::tree::DocTreeReport;
use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::Json;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct AgentDocTreeRequest {
    /// Seed URL; the configured default agent is used when missing or blank
    #[serde(default)]
    pub agent_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetDocumentRequest {
    #[serde(default)]
    pub url: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn agent_doc_tree(
    State(state): State<AppState>,
    Json(request): Json<AgentDocTreeRequest>,
) -> Result<Json<DocTreeReport>, AppError> {
    let seed = request
        .agent_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| state.settings.default_agent_url.clone());

    state.events.append(format!("begin to crawl: {}", seed));

    let crawler = Crawler::new(state.fetcher.as_ref(), &state.events, state.settings.limits);
    let result = crawler.crawl(&seed).await?;

    state.events.append(format!(
        "crawl finished: {} ({} documents)",
        seed,
        result.len()
    ));

    Ok(Json(DocTreeReport::from_crawl(result)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Json(request): Json<GetDocumentRequest>,
) -> Result<Json<DocumentLookup>, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::bad_request("URL parameter cannot be empty"));
    }

    Ok(Json(lookup_document(state.fetcher.as_ref(), url).await))
}

// Logs when the transport drops the subscription (client went away or shutdown)
struct SubscriberGuard;

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        info!("event subscriber disconnected");
    }
}

pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    info!("event subscriber connected");
    let guard = SubscriberGuard;

    let stream = state.streamer.subscribe().map(move |event| {
        let _alive = &guard;
        Ok(SseEvent::default()
            .event("event")
            .id(event.index.to_string())
            .data(event.message))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
