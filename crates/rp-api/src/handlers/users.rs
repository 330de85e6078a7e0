//! User endpoints, keyed by `public_id`.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use rp_core::{NewUser, User};
use serde::Serialize;
use tracing::info;

use super::{hash_password, json_body, require_id, AppState, Message};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct UserCreated {
    pub message: &'static str,
    pub public_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_all_users))
        .route("/users/{id}", get(get_user))
        .route("/users/create", post(create_user))
        .route("/users/update/username/{id}", put(update_username))
        .route("/users/update/password/{id}", put(update_password))
        .route("/users/delete/{id}", delete(delete_user))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = require_id(id, "User")?;
    let user = state.users.get_by_id(&id).await?;
    Ok(Json(user))
}

pub async fn get_all_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.get_all().await?))
}

/// The password is hashed before it reaches the repository.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UserCreated>), ApiError> {
    let mut new_user: NewUser = json_body(body)?;
    new_user.validate()?;

    let password = std::mem::take(&mut new_user.password);
    let password_hash = hash_password(state.hasher.clone(), password).await?;
    let user = state.users.create(new_user, password_hash).await?;

    info!(public_id = %user.public_id, username = %user.username, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully",
            public_id: user.public_id,
        }),
    ))
}

/// Body is a bare JSON string: `"new-name"`.
pub async fn update_username(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = require_id(id, "User")?;
    let username: String = json_body(body)?;
    if username.trim().is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }

    state.users.update_username(&id, &username).await?;
    info!(public_id = %id, "username updated");
    Ok(Message::new("Username updated successfully"))
}

/// Body is a bare JSON string holding the new plaintext password.
pub async fn update_password(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = require_id(id, "User")?;
    let password: String = json_body(body)?;
    if password.is_empty() {
        return Err(ApiError::bad_request("password must not be empty"));
    }

    let password_hash = hash_password(state.hasher.clone(), password).await?;
    state.users.update_password(&id, &password_hash).await?;
    info!(public_id = %id, "password updated");
    Ok(Message::new("Password updated successfully"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = require_id(id, "User")?;
    state.users.delete(&id).await?;
    info!(public_id = %id, "user deleted");
    Ok(Message::new("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use rp_core::{AppError, MockPasswordHasher, MockPostRepo, MockUserRepo};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::router;

    use super::*;

    fn app(users: MockUserRepo, hasher: MockPasswordHasher) -> Router {
        let state = AppState::new(Arc::new(users), Arc::new(MockPostRepo::new()), Arc::new(hasher));
        router(state, Duration::from_secs(2))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_owned())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_create_hashes_before_storing() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|plain| Ok(format!("hashed:{plain}")));

        let mut users = MockUserRepo::new();
        users
            .expect_create()
            .withf(|user, hash| user.password.is_empty() && hash == "hashed:p")
            .times(1)
            .returning(|user, _| {
                Ok(User {
                    public_id: "generated-id".into(),
                    username: user.username,
                    email: user.email,
                })
            });

        let (status, body) = send(
            app(users, hasher),
            "POST",
            "/users/create",
            Some(r#"{"public_id":"mine","username":"alice","email":"a@x.com","password":"p"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["public_id"], "generated-id");
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body() {
        let (status, body) = send(
            app(MockUserRepo::new(), MockPasswordHasher::new()),
            "POST",
            "/users/create",
            Some(r#"{"username": "#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_blank_id_is_required_error() {
        let (status, body) = send(
            app(MockUserRepo::new(), MockPasswordHasher::new()),
            "DELETE",
            "/users/delete/%20",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User ID is required");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let mut users = MockUserRepo::new();
        users
            .expect_update_username()
            .times(1)
            .returning(|id, _| Err(AppError::not_found("User", id)));

        let (status, body) = send(
            app(users, MockPasswordHasher::new()),
            "PUT",
            "/users/update/username/missing",
            Some(r#""bob""#),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_store_error_is_500_without_detail() {
        let mut users = MockUserRepo::new();
        users
            .expect_get_all()
            .times(1)
            .returning(|| Err(AppError::Internal("database is locked".into())));

        let (status, body) = send(app(users, MockPasswordHasher::new()), "GET", "/users", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_update_username_accepts_form_content_type() {
        let mut users = MockUserRepo::new();
        users
            .expect_update_username()
            .withf(|id, name| id == "abc" && name == "bob")
            .times(1)
            .returning(|_, _| Ok(()));

        let req = Request::builder()
            .method("PUT")
            .uri("/users/update/username/abc")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(r#""bob""#))
            .unwrap();
        let response = app(users, MockPasswordHasher::new()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_padded_id_is_passed_through() {
        let mut users = MockUserRepo::new();
        users
            .expect_get_by_id()
            .withf(|id| id == " abc")
            .times(1)
            .returning(|id| Err(AppError::not_found("User", id)));

        let (status, _) = send(app(users, MockPasswordHasher::new()), "GET", "/users/%20abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_utf8_id_is_json_400() {
        let (status, body) = send(
            app(MockUserRepo::new(), MockPasswordHasher::new()),
            "GET",
            "/users/%FF",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid User ID");
    }

    #[tokio::test]
    async fn test_update_password_rejects_non_string_body() {
        let (status, body) = send(
            app(MockUserRepo::new(), MockPasswordHasher::new()),
            "PUT",
            "/users/update/password/abc",
            Some(r#"{"password":"p"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_update_password_stores_hash() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().returning(|_| Ok("$argon2id$stub".into()));

        let mut users = MockUserRepo::new();
        users
            .expect_update_password()
            .withf(|id, hash| id == "abc" && hash == "$argon2id$stub")
            .times(1)
            .returning(|_, _| Ok(()));

        let (status, body) = send(
            app(users, hasher),
            "PUT",
            "/users/update/password/abc",
            Some(r#""s3cret""#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password updated successfully");
    }
}
