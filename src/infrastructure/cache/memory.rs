use super::{Cache, CacheError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

enum Value {
    Text(String),
    Index(Vec<(i64, String)>),
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Process-local cache with the same semantics as the Redis backend.
/// Expired entries are dropped lazily on access.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remaining time to live of a key.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        entries
            .get(key)
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }
}

fn purge_expired(entries: &mut HashMap<String, Entry>) {
    let now = Instant::now();
    entries.retain(|_, entry| entry.expires_at > now);
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        match entries.get(key) {
            Some(Entry {
                value: Value::Text(text),
                ..
            }) => Ok(text.clone()),
            Some(_) => Err(CacheError::WrongType(key.to_string())),
            None => Err(CacheError::NotFound),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        Ok(entries.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Instant::now() + ttl;
        }
        Ok(())
    }

    async fn index_add(
        &self,
        key: &str,
        member: &str,
        score: i64,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        let expires_at = Instant::now() + ttl;
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Index(Vec::new()),
            expires_at,
        });

        let Value::Index(members) = &mut entry.value else {
            return Err(CacheError::WrongType(key.to_string()));
        };

        members.retain(|(_, existing)| existing != member);
        members.push((score, member.to_string()));
        members.sort();
        entry.expires_at = expires_at;
        Ok(())
    }

    async fn index_remove(&self, key: &str, members: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };

        let Value::Index(current) = &mut entry.value else {
            return Err(CacheError::WrongType(key.to_string()));
        };

        current.retain(|(_, member)| !members.contains(member));
        if current.is_empty() {
            entries.remove(key);
        }
        Ok(())
    }

    async fn index_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        match entries.get(key) {
            Some(Entry {
                value: Value::Index(members),
                ..
            }) => Ok(members.iter().map(|(_, member)| member.clone()).collect()),
            Some(_) => Err(CacheError::WrongType(key.to_string())),
            None => Ok(Vec::new()),
        }
    }
}
