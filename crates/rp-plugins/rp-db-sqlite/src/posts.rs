//! `PostRepo` over the `posts` table.

use async_trait::async_trait;
use rp_core::{AppError, NewPost, Post, PostRepo, PostUpdate, Result};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::{db_err, ensure_affected};

const POST_COLUMNS: &str = "id, title, text, poster, posted_at";

pub struct SqlitePostRepo {
    pool: SqlitePool,
}

impl SqlitePostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, poster: Option<&str>) -> Result<Vec<Post>> {
        let mut query = sqlx::query(sql);
        if let Some(poster) = poster {
            query = query.bind(poster);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        rows.iter()
            .map(|row| post_from_row(row).map_err(db_err))
            .collect()
    }
}

fn post_from_row(row: &SqliteRow) -> std::result::Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        poster_id: row.try_get("poster")?,
        posted_at: row.try_get("posted_at")?,
    })
}

#[async_trait]
impl PostRepo for SqlitePostRepo {
    async fn get_all(&self) -> Result<Vec<Post>> {
        self.fetch_many(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id"), None)
            .await
    }

    async fn get_by_id(&self, id: i64) -> Result<Post> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => post_from_row(&row).map_err(db_err),
            None => Err(AppError::not_found("Post", id)),
        }
    }

    async fn get_by_poster_id(&self, poster_id: &str) -> Result<Vec<Post>> {
        self.fetch_many(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE poster = ? ORDER BY id"),
            Some(poster_id),
        )
        .await
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        // `posted_at` comes from the column default.
        let row = sqlx::query(&format!(
            "INSERT INTO posts (title, text, poster) VALUES (?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.title)
        .bind(post.text)
        .bind(post.poster_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let created = post_from_row(&row).map_err(db_err)?;
        debug!(post_id = created.id, poster = %created.poster_id, "post inserted");
        Ok(created)
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<()> {
        let result = sqlx::query("UPDATE posts SET title = ?, text = ? WHERE id = ?")
            .bind(update.title)
            .bind(update.text)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        ensure_affected(result.rows_affected(), "Post", id)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        ensure_affected(result.rows_affected(), "Post", id)
    }
}
