//! Read-through / write-through cache policy.
//!
//! One `CacheThrough` is built per service and cloned into every component,
//! so TTL and key handling stay identical across the group listing, group
//! schedules and teacher lookups.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::CacheConfig;
use crate::storage::{CacheStore, store_from_config};

/// Cache policy wrapped around an optional store.
#[derive(Clone)]
pub struct CacheThrough {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl CacheThrough {
    pub fn new(store: Option<Arc<dyn CacheStore>>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Policy with no store: reads always miss, writes do nothing.
    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(store_from_config(config), config.ttl())
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Return a cached non-empty list, or `None` on any kind of miss.
    ///
    /// Store errors and undecodable entries count as misses.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let store = self.store.as_ref()?;

        let raw = match store.get(key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                log::debug!("Cache miss: {}", key);
                return None;
            }
            Err(e) => {
                log::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) if !items.is_empty() => {
                log::debug!("Cache hit: {} ({} items)", key, items.len());
                Some(items)
            }
            Ok(_) => None,
            Err(e) => {
                log::debug!("Ignoring undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Persist a non-empty list. Failures are logged and dropped.
    pub async fn write<T: Serialize + Sync>(&self, key: &str, items: &[T]) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if items.is_empty() {
            return;
        }

        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Cache encode failed for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = store.set(key, &raw, self.ttl).await {
            log::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    /// Drop every cached entry. A policy without a store succeeds trivially.
    pub async fn flush(&self) -> Result<()> {
        match self.store.as_ref() {
            Some(store) => store.flush_all().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleOption;
    use crate::storage::MemoryCache;

    fn policy() -> (Arc<MemoryCache>, CacheThrough) {
        let store = Arc::new(MemoryCache::new());
        let policy = CacheThrough::new(
            Some(store.clone() as Arc<dyn CacheStore>),
            Duration::from_secs(60),
        );
        (store, policy)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_, cache) = policy();
        let options = vec![ScheduleOption::new("ИС-21", "/shedule_kolledzh/is-21")];

        cache.write("groups", &options).await;
        let back: Vec<ScheduleOption> = cache.read("groups").await.unwrap();
        assert_eq!(back, options);
    }

    #[tokio::test]
    async fn test_empty_list_not_written() {
        let (store, cache) = policy();
        cache.write::<ScheduleOption>("groups", &[]).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss() {
        let (store, cache) = policy();
        store
            .set("groups", "{broken", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.read::<ScheduleOption>("groups").await.is_none());
    }

    #[tokio::test]
    async fn test_oversized_ttl_write_is_dropped() {
        let store = Arc::new(MemoryCache::new());
        let cache = CacheThrough::new(Some(store.clone() as Arc<dyn CacheStore>), Duration::MAX);

        cache
            .write("groups", &[ScheduleOption::new("ИС-21", "/shedule_kolledzh/is-21")])
            .await;
        assert!(store.is_empty());
        assert!(cache.read::<ScheduleOption>("groups").await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_policy() {
        let cache = CacheThrough::disabled();
        cache
            .write("groups", &[ScheduleOption::new("a", "b")])
            .await;
        assert!(cache.read::<ScheduleOption>("groups").await.is_none());
        assert!(cache.flush().await.is_ok());
    }
}
