//! Cache stores placed in front of the origin site.
//!
//! Every store speaks the same small contract: read a value by key, write a
//! value with a lifetime, and drop everything at once. There is no per-key
//! eviction; expiry and `flush_all` are the only ways an entry goes away.
//!
//! ## Key Spaces
//!
//! ```text
//! groups                      # group index listing
//! teachers                    # teacher directory
//! group_schedule:<reference>  # one group's week
//! teacher_schedule:<name>     # one synthesized teacher week
//! ```

pub mod cached;
pub mod local;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CacheBackend, CacheConfig};

pub use cached::CacheThrough;
pub use local::LocalCache;
pub use memory::MemoryCache;

/// Key/value store with TTL expiry and a bulk flush.
///
/// Implementations are shared between concurrent queries and must do their
/// own synchronization.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a live value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove every entry.
    async fn flush_all(&self) -> Result<()>;
}

/// Build the store selected by configuration, `None` for the network-only mode.
pub fn store_from_config(config: &CacheConfig) -> Option<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::None => None,
        CacheBackend::Memory => Some(Arc::new(MemoryCache::new())),
        CacheBackend::File => Some(Arc::new(LocalCache::new(&config.dir))),
    }
}

/// Key for the cached group listing.
pub const GROUPS_KEY: &str = "groups";

/// Key for the cached teacher directory.
pub const TEACHERS_KEY: &str = "teachers";

/// Key for one group's schedule.
pub fn group_schedule_key(reference: &str) -> String {
    format!("group_schedule:{reference}")
}

/// Key for one synthesized teacher schedule.
pub fn teacher_schedule_key(name: &str) -> String {
    format!("teacher_schedule:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespaces() {
        assert_eq!(group_schedule_key("/shedule_kolledzh/is-21"), "group_schedule:/shedule_kolledzh/is-21");
        assert_eq!(teacher_schedule_key("Худякова Н.В."), "teacher_schedule:Худякова Н.В.");
        assert_ne!(GROUPS_KEY, TEACHERS_KEY);
    }

    #[test]
    fn test_store_from_config() {
        let mut config = CacheConfig::default();
        assert!(store_from_config(&config).is_some());

        config.backend = CacheBackend::None;
        assert!(store_from_config(&config).is_none());
    }
}
