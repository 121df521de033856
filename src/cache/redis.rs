//! Redis cache implementation
//!
//! Shared cache for deployments running several server processes. All keys
//! are stored under the `blogicum:` prefix, so `clear` only touches this
//! application's entries.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

const KEY_PREFIX: &str = "blogicum:";

/// Keys fetched per SCAN round trip
const SCAN_COUNT: usize = 100;

pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connect to Redis at `redis_url` (e.g. `redis://localhost:6379`)
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Failed to create Redis client")?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { connection })
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    async fn delete_matching(&self, redis_pattern: &str) -> Result<u64> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut deleted = 0u64;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(redis_pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .context("Failed to scan keys in Redis")?;

            if !keys.is_empty() {
                deleted += keys.len() as u64;
                let _: () = conn.del(&keys).await.context("Failed to delete keys from Redis")?;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.connection.clone();
        let json: Option<String> = conn
            .get(Self::namespaced(key))
            .await
            .context("Failed to get value from Redis")?;

        json.map(|json| serde_json::from_str(&json).context("Failed to deserialize cached value"))
            .transpose()
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;

        // SETEX takes whole seconds and rejects zero.
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(Self::namespaced(key), json, ttl_secs)
            .await
            .context("Failed to set value in Redis")?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(Self::namespaced(key))
            .await
            .context("Failed to delete key from Redis")?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        // Redis MATCH already speaks glob.
        let deleted = self.delete_matching(&Self::namespaced(pattern)).await?;
        tracing::debug!("Deleted {} Redis keys matching {}", deleted, pattern);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.delete_matching(&format!("{}*", KEY_PREFIX)).await?;
        Ok(())
    }
}
