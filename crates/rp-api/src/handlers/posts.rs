//! Post endpoints, keyed by the store-assigned integer id.

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
use rp_core::{NewPost, Post, PostUpdate};
use serde::Serialize;
use tracing::info;

use super::{json_body, require_id, AppState, Message};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct PostCreated {
    pub message: &'static str,
    pub id: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(get_all_posts))
        .route("/posts/{id}", get(get_post))
        .route("/posts/user/{uid}", get(get_posts_by_user))
        .route("/posts/create", post(create_post))
        .route("/posts/update/{id}", put(update_post))
        .route("/posts/delete/{id}", delete(delete_post))
}

fn parse_post_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    require_id(path, "Post")?
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid Post ID"))
}

pub async fn get_all_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.get_all().await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_post_id(id)?;
    Ok(Json(state.posts.get_by_id(id).await?))
}

/// An author without posts gets `[]`, not a 404.
pub async fn get_posts_by_user(
    State(state): State<AppState>,
    uid: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let uid = require_id(uid, "User")?;
    Ok(Json(state.posts.get_by_poster_id(&uid).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<PostCreated>), ApiError> {
    let new_post: NewPost = json_body(body)?;
    new_post.validate()?;

    let post = state.posts.create(new_post).await?;
    info!(post_id = post.id, poster = %post.poster_id, "post created");
    Ok((
        StatusCode::CREATED,
        Json(PostCreated {
            message: "Post created successfully",
            id: post.id,
        }),
    ))
}

pub async fn update_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_post_id(id)?;
    let update: PostUpdate = json_body(body)?;
    update.validate()?;

    state.posts.update(id, update).await?;
    info!(post_id = id, "post updated");
    Ok(Message::new("Post updated successfully"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_post_id(id)?;
    state.posts.delete(id).await?;
    info!(post_id = id, "post deleted");
    Ok(Message::new("Post deleted successfully"))
}
