//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//! Handlers only ever see `Arc<dyn ...>` of these.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewPost, NewUser, Post, PostUpdate, User};

/// Persistence contract for users, keyed by `public_id`.
///
/// Lookups and mutations that touch no row return `AppError::NotFound`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<User>;

    /// Generates the `public_id` and inserts. `password_hash` is stored as given.
    async fn create(&self, user: NewUser, password_hash: String) -> Result<User>;

    async fn update_username(&self, id: &str, username: &str) -> Result<()>;
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<User>>;
}

/// Persistence contract for posts, keyed by the store-assigned integer id.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Post>>;
    async fn get_by_id(&self, id: i64) -> Result<Post>;

    /// An author with no posts yields an empty vec, not `NotFound`.
    async fn get_by_poster_id(&self, poster_id: &str) -> Result<Vec<Post>>;

    async fn create(&self, post: NewPost) -> Result<Post>;
    async fn update(&self, id: i64, update: PostUpdate) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// One-way password hashing applied at the write boundary.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Returns a self-describing hash string (salt included).
    fn hash(&self, password: &str) -> Result<String>;

    /// Checks a plaintext candidate against a stored hash. No endpoint
    /// authenticates yet; this is the check a login flow would make against
    /// what `hash` stored.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
