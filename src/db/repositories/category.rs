//! Category repository
//!
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<Category>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug, published or not
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List categories ordered by title
    async fn list(&self, published_only: bool) -> Result<Vec<Category>>;

    async fn update(&self, category: &Category) -> Result<Category>;

    /// Delete a category; posts keep existing with no category
    async fn delete(&self, id: i64) -> Result<()>;

    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(sqlite_pool(&self.pool)?, category).await
            }
            DatabaseDriver::Mysql => create_category_mysql(mysql_pool(&self.pool)?, category).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_id_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_category_by_id_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_slug_sqlite(sqlite_pool(&self.pool)?, slug).await
            }
            DatabaseDriver::Mysql => get_category_by_slug_mysql(mysql_pool(&self.pool)?, slug).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(sqlite_pool(&self.pool)?, published_only).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(mysql_pool(&self.pool)?, published_only).await
            }
        }
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(sqlite_pool(&self.pool)?, category).await
            }
            DatabaseDriver::Mysql => update_category_mysql(mysql_pool(&self.pool)?, category).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let sql = "DELETE FROM categories WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to delete category")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to delete category")?;
            }
        }
        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.created_at)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        ..category.clone()
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    row.as_ref().map(row_to_category_sqlite).transpose()
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    row.as_ref().map(row_to_category_sqlite).transpose()
}

async fn list_categories_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE (? = 0 OR is_published = 1)
        ORDER BY title, id
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    get_category_by_id_sqlite(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.created_at)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        ..category.clone()
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    row.as_ref().map(row_to_category_mysql).transpose()
}

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    row.as_ref().map(row_to_category_mysql).transpose()
}

async fn list_categories_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE (? = FALSE OR is_published = TRUE)
        ORDER BY title, id
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    get_category_by_id_mysql(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}
