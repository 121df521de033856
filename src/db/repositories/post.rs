//! Post repository
//!
//! Listing queries join the author, category and location and compute the
//! comment count with a correlated sub-select, so one round trip yields a
//! fully annotated page.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::{AuthorRef, CategoryRef, LocationRef, PageWindow, Post, PostFilter, PostView};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<Post>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get a post with its joined rows and comment count
    async fn get_view(&self, id: i64) -> Result<Option<PostView>>;

    /// Number of posts matching `filter`
    async fn count(&self, filter: &PostFilter) -> Result<i64>;

    /// One window of posts matching `filter`, newest `pub_date` first.
    /// Equal dates keep insertion order.
    async fn query(&self, filter: &PostFilter, window: PageWindow) -> Result<Vec<PostView>>;

    async fn update(&self, post: &Post) -> Result<Post>;

    /// Delete a post and, by cascade, its comments
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.image, p.pub_date, p.author_id,
           p.location_id, p.category_id, p.is_published, p.created_at,
           u.username AS author_username,
           c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           l.name AS location_name, l.is_published AS location_is_published,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

// Every condition is disabled by binding NULL (or false for the category flag),
// which keeps one statement for all listings on both backends.
const POST_FILTER_WHERE: &str = r#"
    WHERE (? IS NULL OR p.author_id = ?)
      AND (? IS NULL OR p.category_id = ?)
      AND (? IS NULL OR (p.is_published = 1 AND p.pub_date <= ?))
      AND (? = 0 OR c.is_published = 1)
"#;

const POST_ORDER: &str = "ORDER BY p.pub_date DESC, p.id ASC";

macro_rules! bind_post_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.author_id)
            .bind($filter.author_id)
            .bind($filter.category_id)
            .bind($filter.category_id)
            .bind($filter.visible_at)
            .bind($filter.visible_at)
            .bind($filter.require_published_category)
    };
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(sqlite_pool(&self.pool)?, post).await,
            DatabaseDriver::Mysql => create_post_mysql(mysql_pool(&self.pool)?, post).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.get_view(id).await?.map(|view| view.post))
    }

    async fn get_view(&self, id: i64) -> Result<Option<PostView>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_view_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_post_view_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn count(&self, filter: &PostFilter) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(sqlite_pool(&self.pool)?, filter).await,
            DatabaseDriver::Mysql => count_posts_mysql(mysql_pool(&self.pool)?, filter).await,
        }
    }

    async fn query(&self, filter: &PostFilter, window: PageWindow) -> Result<Vec<PostView>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                query_posts_sqlite(sqlite_pool(&self.pool)?, filter, window).await
            }
            DatabaseDriver::Mysql => query_posts_mysql(mysql_pool(&self.pool)?, filter, window).await,
        }
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let sql = r#"
            UPDATE posts
            SET title = ?, text = ?, image = ?, pub_date = ?, location_id = ?,
                category_id = ?, is_published = ?
            WHERE id = ?
        "#;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(&post.title)
                    .bind(&post.text)
                    .bind(&post.image)
                    .bind(post.pub_date)
                    .bind(post.location_id)
                    .bind(post.category_id)
                    .bind(post.is_published)
                    .bind(post.id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to update post")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(&post.title)
                    .bind(&post.text)
                    .bind(&post.image)
                    .bind(post.pub_date)
                    .bind(post.location_id)
                    .bind(post.category_id)
                    .bind(post.is_published)
                    .bind(post.id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to update post")?;
            }
        }

        self.get_by_id(post.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let sql = "DELETE FROM posts WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to delete post")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to delete post")?;
            }
        }
        Ok(())
    }
}

fn assemble_view(
    post: Post,
    author_username: String,
    category: (Option<String>, Option<String>, Option<bool>),
    location: (Option<String>, Option<bool>),
    comment_count: i64,
) -> PostView {
    let category = match (post.category_id, category) {
        (Some(id), (Some(title), Some(slug), Some(is_published))) => Some(CategoryRef {
            id,
            title,
            slug,
            is_published,
        }),
        _ => None,
    };
    let location = match (post.location_id, location) {
        (Some(id), (Some(name), Some(is_published))) => Some(LocationRef {
            id,
            name,
            is_published,
        }),
        _ => None,
    };

    PostView {
        author: AuthorRef {
            id: post.author_id,
            username: author_username,
        },
        post,
        category,
        location,
        comment_count,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, image, pub_date, author_id, location_id,
                           category_id, is_published, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(&post.image)
    .bind(post.pub_date)
    .bind(post.author_id)
    .bind(post.location_id)
    .bind(post.category_id)
    .bind(post.is_published)
    .bind(post.created_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_rowid(),
        ..post.clone()
    })
}

async fn get_post_view_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<PostView>> {
    let sql = format!("{} WHERE p.id = ?", POST_VIEW_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_view_sqlite))
}

async fn count_posts_sqlite(pool: &SqlitePool, filter: &PostFilter) -> Result<i64> {
    let sql = format!(
        r#"
        SELECT COUNT(*) AS count
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        {}
        "#,
        POST_FILTER_WHERE
    );
    let row = bind_post_filter!(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn query_posts_sqlite(
    pool: &SqlitePool,
    filter: &PostFilter,
    window: PageWindow,
) -> Result<Vec<PostView>> {
    let sql = format!(
        "{} {} {} LIMIT ? OFFSET ?",
        POST_VIEW_SELECT, POST_FILTER_WHERE, POST_ORDER
    );
    let rows = bind_post_filter!(sqlx::query(&sql), filter)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(pool)
        .await
        .context("Failed to query posts")?;

    Ok(rows.iter().map(row_to_post_view_sqlite).collect())
}

fn row_to_post_view_sqlite(row: &sqlx::sqlite::SqliteRow) -> PostView {
    let post = Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        image: row.get("image"),
        pub_date: row.get("pub_date"),
        author_id: row.get("author_id"),
        location_id: row.get("location_id"),
        category_id: row.get("category_id"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    };
    assemble_view(
        post,
        row.get("author_username"),
        (
            row.get("category_title"),
            row.get("category_slug"),
            row.get("category_is_published"),
        ),
        (row.get("location_name"), row.get("location_is_published")),
        row.get("comment_count"),
    )
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, image, pub_date, author_id, location_id,
                           category_id, is_published, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(&post.image)
    .bind(post.pub_date)
    .bind(post.author_id)
    .bind(post.location_id)
    .bind(post.category_id)
    .bind(post.is_published)
    .bind(post.created_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_id() as i64,
        ..post.clone()
    })
}

async fn get_post_view_mysql(pool: &MySqlPool, id: i64) -> Result<Option<PostView>> {
    let sql = format!("{} WHERE p.id = ?", POST_VIEW_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_view_mysql))
}

async fn count_posts_mysql(pool: &MySqlPool, filter: &PostFilter) -> Result<i64> {
    let sql = format!(
        r#"
        SELECT COUNT(*) AS count
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        {}
        "#,
        POST_FILTER_WHERE
    );
    let row = bind_post_filter!(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn query_posts_mysql(
    pool: &MySqlPool,
    filter: &PostFilter,
    window: PageWindow,
) -> Result<Vec<PostView>> {
    let sql = format!(
        "{} {} {} LIMIT ? OFFSET ?",
        POST_VIEW_SELECT, POST_FILTER_WHERE, POST_ORDER
    );
    let rows = bind_post_filter!(sqlx::query(&sql), filter)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(pool)
        .await
        .context("Failed to query posts")?;

    Ok(rows.iter().map(row_to_post_view_mysql).collect())
}

fn row_to_post_view_mysql(row: &sqlx::mysql::MySqlRow) -> PostView {
    let post = Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        image: row.get("image"),
        pub_date: row.get("pub_date"),
        author_id: row.get("author_id"),
        location_id: row.get("location_id"),
        category_id: row.get("category_id"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    };
    assemble_view(
        post,
        row.get("author_username"),
        (
            row.get("category_title"),
            row.get("category_slug"),
            row.get("category_is_published"),
        ),
        (row.get("location_name"), row.get("location_is_published")),
        row.get("comment_count"),
    )
}
