// Data access for users and posts. All SQL lives here.
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use thiserror::Error;

use crate::db::models::{Post, PostInput, User, UserInput};
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the blog database. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct BlogStore {
    pool: DbPool,
}

impl BlogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    // --- Users ---

    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT id, first_name, last_name, image_url FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn get_user(&self, id: i64) -> StoreResult<User> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, first_name, last_name, image_url FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    /// Insert a user and return its new id.
    pub fn create_user(&self, input: UserInput) -> StoreResult<i64> {
        let input = input.validate().map_err(StoreError::Validation)?;

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (first_name, last_name, image_url) VALUES (?1, ?2, ?3)",
            params![input.first_name, input.last_name, input.image_url],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!(user_id = id, "Created user");
        Ok(id)
    }

    /// Overwrite all editable fields of a user.
    pub fn update_user(&self, id: i64, input: UserInput) -> StoreResult<()> {
        let input = input.validate().map_err(StoreError::Validation)?;

        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, image_url = ?3 WHERE id = ?4",
            params![input.first_name, input.last_name, input.image_url, id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(user_id = id, "Updated user");
        Ok(())
    }

    /// Delete a user together with all of their posts, in one transaction.
    pub fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let posts = tx.execute("DELETE FROM posts WHERE user_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if rows == 0 {
            // Dropping the transaction rolls it back
            return Err(StoreError::NotFound);
        }
        tx.commit()?;

        tracing::info!(user_id = id, posts_deleted = posts, "Deleted user");
        Ok(())
    }

    // --- Posts ---

    /// A user's posts, oldest first.
    pub fn list_posts_for_user(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        if !user_exists(&conn, user_id)? {
            return Err(StoreError::NotFound);
        }

        let mut stmt = conn.prepare(
            "SELECT id, title, content, created_at, user_id FROM posts \
             WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let posts = stmt
            .query_map(params![user_id], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    pub fn get_post(&self, id: i64) -> StoreResult<Post> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, title, content, created_at, user_id FROM posts WHERE id = ?1",
            params![id],
            post_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    /// Insert a post owned by `user_id` and return its new id.
    pub fn create_post(&self, user_id: i64, input: PostInput) -> StoreResult<i64> {
        let input = input.validate().map_err(StoreError::Validation)?;

        // Take the write lock up front so the owner can't be deleted
        // between the existence check and the insert
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !user_exists(&tx, user_id)? {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT INTO posts (title, content, created_at, user_id) VALUES (?1, ?2, ?3, ?4)",
            params![input.title, input.content, Utc::now(), user_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(post_id = id, user_id, "Created post");
        Ok(id)
    }

    /// Overwrite a post's title and content. Owner and timestamp are untouched.
    pub fn update_post(&self, id: i64, input: PostInput) -> StoreResult<()> {
        let input = input.validate().map_err(StoreError::Validation)?;

        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE posts SET title = ?1, content = ?2 WHERE id = ?3",
            params![input.title, input.content, id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(post_id = id, "Updated post");
        Ok(())
    }

    pub fn delete_post(&self, id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(post_id = id, "Deleted post");
        Ok(())
    }
}

fn user_exists(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        image_url: row.get(3)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        user_id: row.get(4)?,
    })
}
