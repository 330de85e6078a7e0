//! # rp-api
//!
//! The web routing and orchestration layer for Rusty-Posts.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::time::Duration;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub use handlers::AppState;

/// Builds the full application: user and post routes, `/health`, and the
/// middleware chain.
///
/// Layer order, outermost first: request id, logging, timeout.
/// `request_timeout` bounds every handler including its store calls.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let chain = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(from_fn(middleware::log_request))
        .layer(from_fn_with_state(request_timeout, middleware::request_timeout));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(handlers::users::routes())
        .merge(handlers::posts::routes())
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::route_not_found)
        .layer(chain)
        .with_state(state)
}
