//! Key/value cache abstraction used by the transcription job registry.
//!
//! Besides plain string values the cache exposes a scored index (a Redis
//! sorted set) so that members can be added and removed atomically instead
//! of rewriting a serialized list.

pub mod memory;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use memory::InMemoryCache;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The key does not exist (or has expired).
    #[error("cache key not found")]
    NotFound,
    #[error("cache key {0} holds a value of the wrong type")]
    WrongType(String),
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("cache value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}

#[async_trait]
pub trait Cache: Send + Sync {
    /// Read a string value. A missing key is `CacheError::NotFound`.
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Reset the TTL of an existing key. Missing keys are left alone.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Add `member` to the index at `key` and refresh the index TTL in one step.
    async fn index_add(
        &self,
        key: &str,
        member: &str,
        score: i64,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Remove members from the index. An index left empty disappears.
    async fn index_remove(&self, key: &str, members: &[String]) -> Result<(), CacheError>;

    /// Index members ordered by score. A missing index yields an empty list.
    async fn index_members(&self, key: &str) -> Result<Vec<String>, CacheError>;
}
