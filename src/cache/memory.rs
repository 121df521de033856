//! In-memory cache implementation using moka
//!
//! Each entry carries its own TTL through a moka `Expiry` policy. The
//! configured TTL acts as an upper bound.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// JSON-serialized value plus the TTL it was stored with
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
    ttl: Duration,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T, ttl: Duration) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
            ttl,
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

struct EntryExpiry {
    max_ttl: Duration,
}

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl.min(self.max_ttl))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl.min(self.max_ttl))
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a cache holding at most `max_capacity` entries, none of which
    /// outlives `default_ttl`
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry {
                max_ttl: default_ttl,
            })
            .build();

        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Glob-style match where `*` is any run of characters and `?` exactly one
    fn pattern_matches(pattern: &str, key: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let key: Vec<char> = key.chars().collect();

        // Iterative matcher with single-star backtracking.
        let (mut pi, mut ki) = (0, 0);
        let mut star: Option<(usize, usize)> = None;
        while ki < key.len() {
            match pattern.get(pi) {
                Some('*') => {
                    star = Some((pi, ki));
                    pi += 1;
                }
                Some(&p) if p == '?' || p == key[ki] => {
                    pi += 1;
                    ki += 1;
                }
                _ => match star {
                    Some((star_pi, star_ki)) => {
                        pi = star_pi + 1;
                        ki = star_ki + 1;
                        star = Some((star_pi, star_ki + 1));
                    }
                    None => return false,
                },
            }
        }
        pattern[pi..].iter().all(|&c| c == '*')
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value, ttl)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| Self::pattern_matches(pattern, key.as_ref()))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key).await;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), Duration::from_secs(60)).await.unwrap();
        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        cache.delete("key1").await.unwrap();
        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_per_entry_ttl() {
        let cache = MemoryCache::with_capacity_and_ttl(100, Duration::from_secs(60));

        cache.set("short", &1u32, Duration::from_millis(20)).await.unwrap();
        cache.set("long", &2u32, Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.get::<u32>("short").await.unwrap(), None);
        assert_eq!(cache.get::<u32>("long").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_delete_pattern_and_clear() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("category:slug:news", &1, ttl).await.unwrap();
        cache.set("category:slug:sports", &2, ttl).await.unwrap();
        cache.set("location:1", &3, ttl).await.unwrap();

        cache.delete_pattern("category:*").await.unwrap();
        assert_eq!(cache.get::<i32>("category:slug:news").await.unwrap(), None);
        assert_eq!(cache.get::<i32>("category:slug:sports").await.unwrap(), None);
        assert_eq!(cache.get::<i32>("location:1").await.unwrap(), Some(3));

        cache.clear().await.unwrap();
        assert_eq!(cache.get::<i32>("location:1").await.unwrap(), None);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(MemoryCache::pattern_matches("category:*", "category:slug:news"));
        assert!(MemoryCache::pattern_matches("*", ""));
        assert!(MemoryCache::pattern_matches("user:?:profile", "user:1:profile"));
        assert!(MemoryCache::pattern_matches("a*b*c", "aXXbYYc"));
        assert!(!MemoryCache::pattern_matches("user:?:profile", "user:12:profile"));
        assert!(!MemoryCache::pattern_matches("category:*", "location:1"));
        assert!(!MemoryCache::pattern_matches("abc", "abcd"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// A prefix pattern matches exactly the keys with that prefix.
            #[test]
            fn prefix_pattern_matches_prefixed_keys(
                prefix in "[a-z]{1,8}:",
                suffix in "[a-z0-9:]{0,12}",
                other in "[A-Z]{1,8}",
            ) {
                let pattern = format!("{}*", prefix);
                let key = format!("{}{}", prefix, suffix);
                prop_assert!(MemoryCache::pattern_matches(&pattern, &key));
                prop_assert!(!MemoryCache::pattern_matches(&pattern, &other));
            }
        }
    }
}
