// src/server/mod.rs
// =============================================================================
// The HTTP surface of the explorer (the `serve` subcommand).
//
// Submodules:
// - routes: request handlers
// - error: handler error -> HTTP response mapping
//
// All handlers share one AppState: a fetcher, the process-wide event log and
// the streamer that serves it. Crawls triggered by concurrent requests each
// own their visited set; only the event log is shared.
// =============================================================================

mod error;
mod routes;

use crate::crawl::CrawlLimits;
use crate::events::{EventLog, EventStreamer, ShutdownHandle};
use crate::fetch::DocumentFetcher;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Server-wide crawl settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Seed used when a request doesn't name one
    pub default_agent_url: String,
    pub limits: CrawlLimits,
}

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub events: EventLog,
    pub streamer: EventStreamer,
    pub settings: Arc<ServerSettings>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/agent-doc-tree", post(routes::agent_doc_tree))
        .route("/api/get-document", post(routes::get_document))
        .route("/api/events", get(routes::stream_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Binds and serves until Ctrl-C
//
// On shutdown every live event subscription is ended first, so open SSE
// connections don't hold the graceful shutdown open.
pub async fn serve(host: &str, port: u16, state: AppState, shutdown: ShutdownHandle) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    info!(address = %listener.local_addr()?, "agent explorer listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutting down");
            shutdown.trigger();
        })
        .await
        .context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DEFAULT_POLL_INTERVAL;
    use crate::fetch::testing::StaticFetcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    const DEFAULT_AGENT: &str = "https://agent.example/ad.json";

    fn test_state(fetcher: StaticFetcher) -> (AppState, ShutdownHandle) {
        let events = EventLog::new();
        let (streamer, shutdown) = EventStreamer::new(events.clone(), DEFAULT_POLL_INTERVAL);
        let state = AppState {
            fetcher: Arc::new(fetcher),
            events,
            streamer,
            settings: Arc::new(ServerSettings {
                default_agent_url: DEFAULT_AGENT.to_string(),
                limits: CrawlLimits {
                    max_depth: 4,
                    max_documents: 30,
                },
            }),
        };
        (state, shutdown)
    }

    fn agent_fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with(
                DEFAULT_AGENT,
                json!({"interfaces": [{"url": "https://agent.example/api.yaml"}]}),
            )
            .with("https://agent.example/api.yaml", json!({"paths": {}}))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _shutdown) = test_state(StaticFetcher::new());
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_agent_doc_tree_uses_default_agent() {
        let (state, _shutdown) = test_state(agent_fetcher());
        let events = state.events.clone();

        let response = router(state)
            .oneshot(post_json("/api/agent-doc-tree", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["doc_tree"]["name"], "Root Node");
        assert_eq!(body["doc_tree"]["children"][0]["name"], "ad.json");
        assert_eq!(body["doc_tree"]["children"][0]["children"][0]["name"], "api.yaml");
        assert_eq!(body["visited_urls"].as_array().unwrap().len(), 2);

        assert_eq!(events.get(0).unwrap().message, format!("begin to crawl: {}", DEFAULT_AGENT));
        assert!(events
            .get(events.len() - 1)
            .unwrap()
            .message
            .starts_with("crawl finished"));
    }

    #[tokio::test]
    async fn test_agent_doc_tree_unreachable_seed_is_bad_gateway() {
        let (state, _shutdown) = test_state(StaticFetcher::new());
        let response = router(state)
            .oneshot(post_json(
                "/api/agent-doc-tree",
                json!({"agent_url": "https://nowhere.example/ad.json"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_agent_doc_tree_invalid_seed_is_bad_request() {
        let (state, _shutdown) = test_state(StaticFetcher::new());
        let response = router(state)
            .oneshot(post_json("/api/agent-doc-tree", json!({"agent_url": "not-a-url"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_document_rejects_empty_url() {
        let (state, _shutdown) = test_state(StaticFetcher::new());
        let response = router(state)
            .oneshot(post_json("/api/get-document", json!({"url": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "URL parameter cannot be empty"
        );
    }

    #[tokio::test]
    async fn test_get_document_reports_success_and_failure() {
        let (state, _shutdown) = test_state(agent_fetcher());
        let app = router(state);

        let found = app
            .clone()
            .oneshot(post_json("/api/get-document", json!({"url": DEFAULT_AGENT})))
            .await
            .unwrap();
        let found = body_json(found).await;
        assert_eq!(found["success"], true);
        assert_eq!(found["content"]["interfaces"][0]["url"], "https://agent.example/api.yaml");

        let missing = app
            .oneshot(post_json(
                "/api/get-document",
                json!({"url": "https://agent.example/missing"}),
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::OK);
        let missing = body_json(missing).await;
        assert_eq!(missing["success"], false);
        assert!(missing["content"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_stream_backlog_until_shutdown() {
        let (state, shutdown) = test_state(StaticFetcher::new());
        state.events.append("first");
        state.events.append("second");

        let response = router(state)
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            shutdown.trigger();
        });

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("event: event"));
        assert!(text.contains("data: first"));
        assert!(text.contains("id: 1"));
        assert!(text.find("data: first").unwrap() < text.find("data: second").unwrap());
    }
}
