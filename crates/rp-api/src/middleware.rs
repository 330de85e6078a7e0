//! rusty-posts/crates/rp-api/src/middleware.rs Middleware
//!
//! Request logging and the per-request deadline.
//!
//! Both are plain `axum::middleware::from_fn` functions so they compose with
//! `tower::ServiceBuilder`, which applies layers outer-to-inner in the order
//! they are declared. The router puts logging outside the timeout, so the
//! logged duration covers the whole deadline-bounded handler.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::error::ErrorBody;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs method, path, remote address, status and wall-clock duration.
/// The request and response pass through untouched.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    // Absent when the router is driven without a socket (e.g. `oneshot`)
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    info!(%method, %path, %remote, %request_id, "received request");
    let start = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        %path,
        %remote,
        %request_id,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}

/// Bounds the rest of the chain by `limit`.
///
/// On expiry the inner future is dropped, which cancels any pending pool
/// acquisition or query at its next await point. A statement already handed
/// to SQLite may still run to completion.
pub async fn request_timeout(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%path, limit_ms = limit.as_millis() as u64, "request timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new("Request timed out")),
            )
                .into_response()
        }
    }
}
