//! User repository
//!
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user, returning it with its assigned ID
    async fn create(&self, user: &User) -> Result<User>;

    /// Create a newly registered user. The role is `Admin` when no other
    /// user exists yet and `Author` otherwise, decided atomically with the
    /// insert. `user.role` is ignored.
    async fn create_registered(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Update profile fields and role
    async fn update(&self, user: &User) -> Result<User>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(sqlite_pool(&self.pool)?, user).await,
            DatabaseDriver::Mysql => create_user_mysql(mysql_pool(&self.pool)?, user).await,
        }
    }

    async fn create_registered(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_registered_user_sqlite(sqlite_pool(&self.pool)?, user).await
            }
            DatabaseDriver::Mysql => {
                create_registered_user_mysql(mysql_pool(&self.pool)?, user).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_id_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_user_by_id_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_username_sqlite(sqlite_pool(&self.pool)?, username).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_username_mysql(mysql_pool(&self.pool)?, username).await
            }
        }
    }

    async fn update(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_user_sqlite(sqlite_pool(&self.pool)?, user).await,
            DatabaseDriver::Mysql => update_user_mysql(mysql_pool(&self.pool)?, user).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_user_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => delete_user_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_users_sqlite(sqlite_pool(&self.pool)?).await,
            DatabaseDriver::Mysql => count_users_mysql(mysql_pool(&self.pool)?).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        ..user.clone()
    })
}

// SQLite serializes writers, so the emptiness check inside the INSERT cannot
// interleave with another registration.
async fn create_registered_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, role, created_at, updated_at)
        SELECT ?, ?, ?, ?, ?, CASE WHEN EXISTS (SELECT 1 FROM users) THEN ? ELSE ? END, ?, ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(UserRole::Author.to_string())
    .bind(UserRole::Admin.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    get_user_by_id_sqlite(pool, result.last_insert_rowid())
        .await?
        .context("Created user disappeared")
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn update_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, first_name = ?, last_name = ?, role = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_id_sqlite(pool, user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(())
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        ..user.clone()
    })
}

async fn create_registered_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let mut tx = pool.begin().await.context("Failed to begin registration")?;

    // Locks the scanned range so a concurrent first registration waits
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users FOR UPDATE")
        .fetch_one(&mut *tx)
        .await
        .context("Failed to count users")?;
    let role = if count == 0 { UserRole::Admin } else { UserRole::Author };

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(role.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *tx)
    .await
    .context("Failed to create user")?;

    tx.commit().await.context("Failed to commit registration")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        role,
        ..user.clone()
    })
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn update_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, first_name = ?, last_name = ?, role = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.to_string())
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_id_mysql(pool, user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(())
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_user(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hashed_password".to_string(),
            UserRole::Author,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo.create(&test_user("alice")).await.expect("Failed to create user");
        assert!(created.id > 0);

        let by_id = repo.get_by_id(created.id).await.unwrap().expect("User should exist");
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.password_hash, "hashed_password");
        assert_eq!(by_id.role, UserRole::Author);

        let by_name = repo.get_by_username("alice").await.unwrap().expect("User should exist");
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let (_pool, repo) = setup_test_repo().await;

        let mut user = repo.create(&test_user("bob")).await.unwrap();
        user.first_name = "Bob".to_string();
        user.last_name = "Builder".to_string();
        user.role = UserRole::Admin;

        let updated = repo.update(&user).await.expect("Failed to update user");
        assert_eq!(updated.first_name, "Bob");
        assert_eq!(updated.last_name, "Builder");
        assert!(updated.is_admin());
    }

    #[tokio::test]
    async fn test_delete_and_count_users() {
        let (_pool, repo) = setup_test_repo().await;

        assert_eq!(repo.count().await.unwrap(), 0);
        let user = repo.create(&test_user("carol")).await.unwrap();
        repo.create(&test_user("dave")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        repo.delete(user.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_registered_promotes_only_first_user() {
        let (_pool, repo) = setup_test_repo().await;

        let mut first = test_user("founder");
        first.role = UserRole::Author;
        let first = repo.create_registered(&first).await.expect("Failed to register user");
        assert_eq!(first.role, UserRole::Admin);

        let mut second = test_user("visitor");
        second.role = UserRole::Admin;
        let second = repo.create_registered(&second).await.unwrap();
        assert_eq!(second.role, UserRole::Author);

        let stored = repo.get_by_id(first.id).await.unwrap().expect("User should exist");
        assert!(stored.is_admin());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_yield_one_admin() {
        let (_pool, repo) = setup_test_repo().await;
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create_registered(&test_user(&format!("user{}", i))).await })
            })
            .collect();
        let mut admins = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_admin() {
                admins += 1;
            }
        }
        assert_eq!(admins, 1);
        assert_eq!(repo.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_unique_username_constraint() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&test_user("erin")).await.unwrap();
        assert!(repo.create(&test_user("erin")).await.is_err());
    }
}
