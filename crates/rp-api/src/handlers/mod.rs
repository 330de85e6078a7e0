//! # rp-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core ports.
//! Each entity module exposes `routes()`; handlers are stateless and reach the
//! store only through `AppState`.

pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rp_core::{AppError, PasswordHasher, PostRepo, UserRepo};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ApiError, ErrorBody};

/// State shared across all request tasks.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepo>,
        posts: Arc<dyn PostRepo>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self { users, posts, hasher }
    }
}

/// `{"message": "..."}` confirmation body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Liveness probe. Does not touch the store.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Unmatched paths get the same JSON error shape as handler failures.
pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ErrorBody::new("Method not allowed")))
}

/// Extracts the `{id}` segment. Segments that decode to blanks
/// (`/users/%20`) are missing; anything else is passed on untouched.
fn require_id(path: Result<Path<String>, PathRejection>, entity: &str) -> Result<String, ApiError> {
    let Path(id) = path.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "rejected path parameter");
        ApiError::bad_request(format!("Invalid {entity} ID"))
    })?;
    if id.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{entity} ID is required")));
    }
    Ok(id)
}

/// Decodes a JSON body whatever the request's content type says. Unreadable
/// bodies, bad JSON and the wrong shape all collapse into a single 400.
fn json_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let bytes = body.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "unreadable request body");
        ApiError::bad_request("Invalid request body")
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        ApiError::bad_request("Invalid request body")
    })
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_password(hasher: Arc<dyn PasswordHasher>, password: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))??;
    Ok(hash)
}
