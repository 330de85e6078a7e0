//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Posts.
//! Users are addressed by a server-generated UUID v4 (`public_id`);
//! posts by the integer key the store assigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as it is read back out of the store.
///
/// The password never leaves the store, so it has no field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Generated once at creation, never taken from client input
    pub public_id: String,
    pub username: String,
    pub email: String,
}

/// Creation payload for a user.
///
/// Any `public_id` the client sends is ignored by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Rejects payloads with blank fields or an email without `@`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.username.trim().is_empty() {
            return Err(crate::AppError::ValidationError("username must not be empty".into()));
        }
        if !self.email.contains('@') {
            return Err(crate::AppError::ValidationError("email must be a valid address".into()));
        }
        if self.password.is_empty() {
            return Err(crate::AppError::ValidationError("password must not be empty".into()));
        }
        Ok(())
    }
}

/// A post written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// `public_id` of the author
    pub poster_id: String,
    pub posted_at: DateTime<Utc>,
}

/// Creation payload for a post.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    #[serde(alias = "poster")]
    pub poster_id: String,
}

impl NewPost {
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::AppError::ValidationError("title must not be empty".into()));
        }
        if self.poster_id.trim().is_empty() {
            return Err(crate::AppError::ValidationError("poster_id must not be empty".into()));
        }
        Ok(())
    }
}

/// Editable fields of a post. The author and timestamp are fixed at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct PostUpdate {
    pub title: String,
    pub text: String,
}

impl PostUpdate {
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::AppError::ValidationError("title must not be empty".into()));
        }
        Ok(())
    }
}
