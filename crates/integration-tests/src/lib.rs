//! Shared harness for the end-to-end API tests.
//!
//! Every test gets its own `sqlite::memory:` database behind the real
//! repositories, the Argon2 hasher and the full middleware chain, and drives
//! the router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rp_api::{router, AppState};
use rp_auth_argon2::Argon2Hasher;
use rp_db_sqlite::{PoolConfig, SqlitePostRepo, SqliteUserRepo};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub use serde_json::json;

/// A fresh application over an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    let pool = rp_db_sqlite::connect("sqlite::memory:", &PoolConfig::in_memory())
        .await
        .expect("in-memory database");

    let state = AppState::new(
        Arc::new(SqliteUserRepo::new(pool.clone())),
        Arc::new(SqlitePostRepo::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
    );
    TestApp {
        router: router(state, Duration::from_secs(2)),
        pool,
    }
}

pub struct TestApp {
    router: Router,
    /// Same database the router writes to.
    pub pool: SqlitePool,
}

/// Status plus the decoded JSON body (`Null` when the body is not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body.to_string())).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send("PUT", uri, Some(body.to_string())).await
    }

    /// Sends `raw` verbatim with a JSON content type.
    pub async fn send_raw(&self, method: &str, uri: &str, raw: &str) -> TestResponse {
        self.send(method, uri, Some(raw.to_owned())).await
    }

    /// Sends `raw` with no content type at all, as `curl -d` clients may.
    pub async fn send_untyped(&self, method: &str, uri: &str, raw: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(raw.to_owned()))
            .expect("valid request");
        self.dispatch(request).await
    }

    /// Creates a user and returns its generated `public_id`.
    pub async fn create_user(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/users/create",
                json!({ "username": username, "email": format!("{username}@x.com"), "password": "p" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["public_id"]
            .as_str()
            .expect("public_id in create response")
            .to_owned()
    }

    /// Creates a post and returns its id.
    pub async fn create_post(&self, title: &str, poster_id: &str) -> i64 {
        let response = self
            .post_json(
                "/posts/create",
                json!({ "title": title, "text": "body", "poster_id": poster_id }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().expect("id in create response")
    }

    /// The password column as stored for `public_id`.
    pub async fn stored_password(&self, public_id: &str) -> String {
        sqlx::query_scalar("SELECT password FROM users WHERE public_id = ?")
            .bind(public_id)
            .fetch_one(&self.pool)
            .await
            .expect("user row")
    }

    async fn send(&self, method: &str, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json)
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).expect("valid request")).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }
}
