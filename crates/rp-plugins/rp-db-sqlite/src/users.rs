//! `UserRepo` over the `users` table.

use async_trait::async_trait;
use rp_core::{AppError, NewUser, Result, User, UserRepo};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::{db_err, ensure_affected};

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// The password column is never projected.
fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        public_id: row.try_get("public_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
    })
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn get_by_id(&self, id: &str) -> Result<User> {
        let row = sqlx::query("SELECT public_id, username, email FROM users WHERE public_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => user_from_row(&row).map_err(db_err),
            None => Err(AppError::not_found("User", id)),
        }
    }

    async fn create(&self, user: NewUser, password_hash: String) -> Result<User> {
        let public_id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO users (public_id, username, email, password) VALUES (?, ?, ?, ?)")
            .bind(public_id.as_str())
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        debug!(public_id = %public_id, username = %user.username, "user inserted");
        Ok(User {
            public_id,
            username: user.username,
            email: user.email,
        })
    }

    async fn update_username(&self, id: &str, username: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET username = ? WHERE public_id = ?")
            .bind(username)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        ensure_affected(result.rows_affected(), "User", id)
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE public_id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        ensure_affected(result.rows_affected(), "User", id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE public_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        ensure_affected(result.rows_affected(), "User", id)
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT public_id, username, email FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(db_err))
            .collect()
    }
}
