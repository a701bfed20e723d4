//! In-process cache store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::CacheStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Cache store kept in a mutex-guarded map. Contents die with the process.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().map_err(AppError::cache)?;
        let expired = match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| AppError::cache(format!("ttl of {}s is out of range", ttl.as_secs())))?;
        let mut entries = self.entries.lock().map_err(AppError::cache)?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn flush_all(&self) -> Result<()> {
        self.entries.lock().map_err(AppError::cache)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(60 * 60 * 24 * 7);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("groups", "[]", WEEK).await.unwrap();
        assert_eq!(cache.get("groups").await.unwrap(), Some("[]".to_string()));
        assert_eq!(cache.get("teachers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = MemoryCache::new();
        cache.set("groups", "[]", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("groups").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_flush_all() {
        let cache = MemoryCache::new();
        cache.set("a", "1", WEEK).await.unwrap();
        cache.set("b", "2", WEEK).await.unwrap();
        cache.flush_all().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_an_error() {
        let cache = MemoryCache::new();
        assert!(cache.set("groups", "[]", Duration::MAX).await.is_err());
        assert!(cache.is_empty());
    }
}
