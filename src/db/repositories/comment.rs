//! Comment repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentView};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get a comment only if it belongs to `post_id`
    async fn get_by_id_and_post(&self, id: i64, post_id: i64) -> Result<Option<Comment>>;

    /// Comments of a post with author names, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentView>>;

    async fn count_by_post(&self, post_id: i64) -> Result<i64>;

    /// Update the comment text
    async fn update(&self, comment: &Comment) -> Result<Comment>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_comment_sqlite(sqlite_pool(&self.pool)?, comment).await,
            DatabaseDriver::Mysql => create_comment_mysql(mysql_pool(&self.pool)?, comment).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let sql = "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID")?;
                Ok(row.as_ref().map(row_to_comment_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID")?;
                Ok(row.as_ref().map(row_to_comment_mysql))
            }
        }
    }

    async fn get_by_id_and_post(&self, id: i64, post_id: i64) -> Result<Option<Comment>> {
        let sql = r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE id = ? AND post_id = ?
        "#;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .bind(post_id)
                    .fetch_optional(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID and post")?;
                Ok(row.as_ref().map(row_to_comment_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .bind(post_id)
                    .fetch_optional(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to get comment by ID and post")?;
                Ok(row.as_ref().map(row_to_comment_mysql))
            }
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentView>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_by_post_sqlite(sqlite_pool(&self.pool)?, post_id).await
            }
            DatabaseDriver::Mysql => {
                list_comments_by_post_mysql(mysql_pool(&self.pool)?, post_id).await
            }
        }
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let sql = "SELECT COUNT(*) AS count FROM comments WHERE post_id = ?";
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(post_id)
                .fetch_one(sqlite_pool(&self.pool)?)
                .await
                .context("Failed to count comments")?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(post_id)
                .fetch_one(mysql_pool(&self.pool)?)
                .await
                .context("Failed to count comments")?
                .get("count"),
        };
        Ok(count)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment> {
        let sql = "UPDATE comments SET text = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(&comment.text)
                    .bind(comment.id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to update comment")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(&comment.text)
                    .bind(comment.id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to update comment")?;
            }
        }

        self.get_by_id(comment.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let sql = "DELETE FROM comments WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to delete comment")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to delete comment")?;
            }
        }
        Ok(())
    }
}

const LIST_BY_POST_SQL: &str = r#"
    SELECT cm.id, cm.post_id, cm.author_id, cm.text, cm.created_at,
           u.username AS author_username
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
    WHERE cm.post_id = ?
    ORDER BY cm.created_at ASC, cm.id ASC
"#;

// ===== SQLite implementations =====

async fn create_comment_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.text)
    .bind(comment.created_at)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        ..comment.clone()
    })
}

async fn list_comments_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentView>> {
    let rows = sqlx::query(LIST_BY_POST_SQL)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentView {
            comment: row_to_comment_sqlite(row),
            author_username: row.get("author_username"),
        })
        .collect())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}

// ===== MySQL implementations =====

async fn create_comment_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(&comment.text)
    .bind(comment.created_at)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        ..comment.clone()
    })
}

async fn list_comments_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<CommentView>> {
    let rows = sqlx::query(LIST_BY_POST_SQL)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentView {
            comment: row_to_comment_mysql(row),
            author_username: row.get("author_username"),
        })
        .collect())
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}
