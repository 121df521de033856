//! Database layer
//!
//! SQLite (default, single file) or MySQL, selected by configuration.
//! Repositories work against the `DatabasePool` trait object and dispatch on
//! its driver.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! let posts = SqlxPostRepository::boxed(pool.clone());
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
