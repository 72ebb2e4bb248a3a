//! Redis key-value adapter
//!
//! Backed by a `ConnectionManager`, which reconnects on its own; each call
//! clones the manager handle so concurrent requests multiplex over one
//! connection.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use std::time::Duration;
use wayfarer_core::error::{Result, WayfarerError};

use crate::ports::KeyValueStore;

fn cache_error(action: &str, err: RedisError) -> WayfarerError {
    WayfarerError::Cache(format!("Redis {} failed: {}", action, err))
}

/// Whole seconds for a TTL, never zero since Redis rejects that
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Inclusive ZREVRANGE bounds for an offset/limit page
///
/// Redis reads negative indexes from the tail, so offsets past `isize::MAX`
/// yield an empty page instead.
fn page_bounds(offset: usize, limit: usize) -> Option<(isize, isize)> {
    const MAX_INDEX: usize = isize::MAX as usize;
    if limit == 0 || offset > MAX_INDEX {
        return None;
    }
    let stop = offset.saturating_add(limit - 1).min(MAX_INDEX);
    Some((offset as isize, stop as isize))
}

/// Redis implementation of KeyValueStore
#[derive(Clone)]
pub struct RedisKeyValueStore {
    manager: ConnectionManager,
}

impl RedisKeyValueStore {
    /// Connect to Redis at the given URL (`redis://host:port/db`)
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| WayfarerError::ConfigInvalid {
            key: "REDIS_URL".to_string(),
            reason: e.to_string(),
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| cache_error("connect", e))?;
        let store = Self { manager };
        store.health_check().await?;
        tracing::info!("Connected to Redis");

        Ok(store)
    }

    /// Round-trip a PING
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String =
            redis::cmd("PING").query_async(&mut conn).await.map_err(|e| cache_error("PING", e))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(|e| cache_error("GET", e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.set(key, value).await.map_err(|e| cache_error("SET", e))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.set_ex(key, value, ttl_secs(ttl)).await.map_err(|e| cache_error("SETEX", e))
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.manager.clone();
        conn.del(keys).await.map_err(|e| cache_error("DEL", e))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        conn.exists(key).await.map_err(|e| cache_error("EXISTS", e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: bool = conn
            .expire(key, ttl_secs(ttl) as i64)
            .await
            .map_err(|e| cache_error("EXPIRE", e))?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: i64 = conn.zadd(key, member, score).await.map_err(|e| cache_error("ZADD", e))?;
        Ok(())
    }

    async fn zincrby(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        let mut conn = self.manager.clone();
        conn.zincr(key, member, delta).await.map_err(|e| cache_error("ZINCRBY", e))
    }

    async fn zrevrange(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>> {
        let Some((start, stop)) = page_bounds(offset, limit) else {
            return Ok(Vec::new());
        };
        let mut conn = self.manager.clone();
        conn.zrevrange(key, start, stop).await.map_err(|e| cache_error("ZREVRANGE", e))
    }

    async fn zmembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        conn.zrange(key, 0, -1).await.map_err(|e| cache_error("ZRANGE", e))
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let mut conn = self.manager.clone();
        conn.zscore(key, member).await.map_err(|e| cache_error("ZSCORE", e))
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<usize> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.manager.clone();
        conn.zrem(key, members).await.map_err(|e| cache_error("ZREM", e))
    }
}
