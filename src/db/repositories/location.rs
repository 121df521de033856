//! Location repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::Location;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &Location) -> Result<Location>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List locations ordered by name
    async fn list(&self, published_only: bool) -> Result<Vec<Location>>;

    async fn update(&self, location: &Location) -> Result<Location>;

    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, location: &Location) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_location_sqlite(sqlite_pool(&self.pool)?, location).await
            }
            DatabaseDriver::Mysql => create_location_mysql(mysql_pool(&self.pool)?, location).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_location_by_id_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_location_by_id_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_locations_sqlite(sqlite_pool(&self.pool)?, published_only).await
            }
            DatabaseDriver::Mysql => {
                list_locations_mysql(mysql_pool(&self.pool)?, published_only).await
            }
        }
    }

    async fn update(&self, location: &Location) -> Result<Location> {
        let sql = "UPDATE locations SET name = ?, is_published = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(&location.name)
                    .bind(location.is_published)
                    .bind(location.id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to update location")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(&location.name)
                    .bind(location.is_published)
                    .bind(location.id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to update location")?;
            }
        }

        self.get_by_id(location.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Location not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let sql = "DELETE FROM locations WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(sqlite_pool(&self.pool)?)
                    .await
                    .context("Failed to delete location")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(id)
                    .execute(mysql_pool(&self.pool)?)
                    .await
                    .context("Failed to delete location")?;
            }
        }
        Ok(())
    }
}

// ===== SQLite implementations =====

async fn create_location_sqlite(pool: &SqlitePool, location: &Location) -> Result<Location> {
    let result = sqlx::query(
        "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
    )
    .bind(&location.name)
    .bind(location.is_published)
    .bind(location.created_at)
    .execute(pool)
    .await
    .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_rowid(),
        ..location.clone()
    })
}

async fn get_location_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.as_ref().map(row_to_location_sqlite))
}

async fn list_locations_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Location>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_published, created_at
        FROM locations
        WHERE (? = 0 OR is_published = 1)
        ORDER BY name, id
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_sqlite).collect())
}

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

// ===== MySQL implementations =====

async fn create_location_mysql(pool: &MySqlPool, location: &Location) -> Result<Location> {
    let result = sqlx::query(
        "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
    )
    .bind(&location.name)
    .bind(location.is_published)
    .bind(location.created_at)
    .execute(pool)
    .await
    .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_id() as i64,
        ..location.clone()
    })
}

async fn get_location_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.as_ref().map(row_to_location_mysql))
}

async fn list_locations_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Location>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_published, created_at
        FROM locations
        WHERE (? = FALSE OR is_published = TRUE)
        ORDER BY name, id
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_mysql).collect())
}

fn row_to_location_mysql(row: &sqlx::mysql::MySqlRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}
