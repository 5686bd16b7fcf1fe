//! Local caching proxy running the gate
//!
//! Install at startup, then intercept every request: the proxy listens on a
//! local address and answers each request through the gate against the
//! configured origin.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheStorage, RequestKey, StoredResponse};
use crate::config::GateSettings;
use crate::net::{FetchRequest, HttpFetcher};

use super::CacheGate;

/// Headers that only describe the original transport hop and must not be
/// replayed from the cache.
const HOP_BY_HOP: [&str; 3] = ["connection", "transfer-encoding", "content-length"];

/// Inbound headers that must not be forwarded: they describe the hop to the
/// proxy, and the client recomputes them for the hop to the origin.
const SKIP_FORWARD: [&str; 4] = ["host", "connection", "transfer-encoding", "content-length"];

/// Upper bound on a buffered request body
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Start the proxy: open the partition, run install, serve.
///
/// A failed install aborts startup; the supervisor (or the operator) decides
/// whether to retry.
pub async fn run_gate(settings: GateSettings) -> Result<()> {
    let storage = CacheStorage::new();
    let partition = storage.open(&settings.partition).await;

    let fetcher = HttpFetcher::from_origin(&settings.origin)?;
    let gate = Arc::new(CacheGate::new(partition, Arc::new(fetcher)));

    gate.handle_install(&settings.preload)
        .await
        .context("cache gate install failed")?;

    let app = build_router(gate);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid gate address: {}", e))?;

    tracing::info!(%addr, origin = %settings.origin, partition = %settings.partition, "gate listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Router answering every path through the gate
pub fn build_router(gate: Arc<CacheGate>) -> Router {
    Router::new()
        .fallback(intercept)
        .with_state(gate)
        .layer(TraceLayer::new_for_http())
}

/// Handle one intercepted request
async fn intercept(State(gate): State<Arc<CacheGate>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let key = RequestKey::new(parts.method.as_str(), path);

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!(url = %key.url, error = %e, "could not buffer request body");
            return plain_response(StatusCode::BAD_REQUEST, format!("gate error: {}", e));
        }
    };

    // Forward the identical request: a miss must reach the origin with its
    // headers and body intact, not just method and path.
    let headers = parts
        .headers
        .iter()
        .filter(|(name, _)| {
            !SKIP_FORWARD
                .iter()
                .any(|h| name.as_str().eq_ignore_ascii_case(h))
        })
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let request = FetchRequest { key, headers, body };

    match gate.handle_fetch(&request).await {
        Ok(stored) => into_response(stored),
        Err(e) => {
            tracing::warn!(url = %request.key.url, error = %e, "gate fetch failed");
            plain_response(StatusCode::BAD_GATEWAY, format!("gate error: {}", e))
        }
    }
}

fn into_response(stored: StoredResponse) -> Response {
    let status =
        StatusCode::from_u16(stored.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder().status(status);
    for (name, value) in &stored.headers {
        if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }

    match builder.body(Body::from(stored.body)) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "stored response carried unusable headers");
            plain_response(StatusCode::BAD_GATEWAY, "unserveable cached response".to_string())
        }
    }
}

fn plain_response(status: StatusCode, message: String) -> Response {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}
