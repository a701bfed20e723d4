//! Local filesystem cache store.
//!
//! Each key is stored as one JSON envelope named after the SHA-256 of the key,
//! so keys with slashes or Cyrillic text map to safe file names.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── 3f1a…9c.json     # {"key": "groups", "expires_at": "...", "value": "..."}
//! └── 8be0…41.json     # {"key": "group_schedule:/shedule_kolledzh/is-21", ...}
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::CacheStore;

/// On-disk wrapper around a cached value.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: String,
    expires_at: DateTime<Utc>,
    value: String,
}

/// Cache store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root_dir: PathBuf,
}

impl LocalCache {
    /// Create a LocalCache rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File path for a cache key.
    fn path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root_dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Whether a file name is one this store writes: a SHA-256 hex stem with
    /// a `json` or `tmp` extension.
    fn is_entry_file(path: &Path) -> bool {
        let has_entry_ext = path
            .extension()
            .is_some_and(|ext| ext == "json" || ext == "tmp");
        let has_digest_stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| {
                stem.len() == 64 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            });
        has_entry_ext && has_digest_stem
    }

    async fn remove_if_exists(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl CacheStore for LocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        let Some(bytes) = self.read_bytes(&path).await? else {
            return Ok(None);
        };

        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        if envelope.key != key || Utc::now() >= envelope.expires_at {
            Self::remove_if_exists(&path).await?;
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| AppError::cache(format!("ttl of {}s is out of range", ttl.as_secs())))?;
        let envelope = Envelope {
            key: key.to_string(),
            expires_at,
            value: value.to_string(),
        };
        let bytes = serde_json::to_vec(&envelope)?;
        self.write_bytes(&self.path(key), &bytes).await
    }

    async fn flush_all(&self) -> Result<()> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut removed = 0usize;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if Self::is_entry_file(&path) {
                Self::remove_if_exists(&path).await?;
                removed += 1;
            }
        }

        log::info!(
            "Flushed {} cache files from {}",
            removed,
            self.root_dir.display()
        );
        Ok(())
    }
}
