//! Local content cache for downloaded build logs.
//!
//! Build logs of finished jobs never change, so a log body fetched once is
//! kept on disk and served from there on later runs.
//!
//! # Cache Structure
//!
//! ```text
//! ./.cache/
//!   <32 base-32 chars>   # raw log body, one file per fetch key
//! ```
//!
//! Entries older than [`RETENTION`] are deleted when the cache is opened.
//! Filenames are a truncated encoding of the key, so two keys may collide;
//! the cache is best-effort and a collision returns the other key's body.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FlakeResult;

#[path = "cache_next/mod.rs"]
mod cache_next;

/// Retention window for cache entries (3 weeks).
pub const RETENTION: Duration = Duration::from_secs(21 * 24 * 60 * 60);

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./.cache";

/// Key/blob store backed by a flat directory.
#[derive(Debug, Clone)]
pub struct BlobCache {
    /// Base cache directory.
    cache_dir: PathBuf,
}

impl BlobCache {
    /// Open the cache, creating the directory and evicting stale entries.
    pub async fn open(cache_dir: impl Into<PathBuf>) -> FlakeResult<Self> {
        Self::open_with_retention(cache_dir, RETENTION).await
    }

    /// Open the cache with a custom retention window.
    pub async fn open_with_retention(
        cache_dir: impl Into<PathBuf>,
        retention: Duration,
    ) -> FlakeResult<Self> {
        let cache = Self {
            cache_dir: cache_dir.into(),
        };
        cache_next::io::ensure_dir_impl(&cache.cache_dir).await?;
        cache_next::evict::sweep_expired_impl(&cache, retention).await?;
        Ok(cache)
    }

    /// Get the cache directory.
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the file holding `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        cache_next::keys::entry_path_impl(&self.cache_dir, key)
    }

    /// Get the stored body for `key`. `None` is a cache miss, not an error.
    pub async fn retrieve(&self, key: &str) -> FlakeResult<Option<String>> {
        cache_next::read::retrieve_impl(self, key).await
    }

    /// Store `value` under `key`, replacing any previous body.
    pub async fn store(&self, key: &str, value: &str) -> FlakeResult<()> {
        cache_next::put::store_impl(self, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::SystemTime;
    use tempfile::TempDir;

    const KEY: &str = "https://prow.ci.openshift.org/view/gs/test-platform-results/pr-logs/pull/org_repo/101/pull-ci-org-repo-master-e2e/1700000000000000001";

    async fn create_test_cache() -> (BlobCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::open(temp_dir.path().join("cache")).await.unwrap();
        (cache, temp_dir)
    }

    fn age_file(path: &Path, days: u64) {
        let mtime = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let (cache, _temp_dir) = create_test_cache().await;
        let body = "\x1b[36mINFO\x1b[0m[2023-06-15T10:38:01Z] Using namespace ci-op-1\n";

        cache.store(KEY, body).await.unwrap();

        let entry = cache.retrieve(KEY).await.unwrap();
        assert_eq!(entry.as_deref(), Some(body));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _temp_dir) = create_test_cache().await;

        let result = cache.retrieve("https://example.com/never/stored").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let (cache, _temp_dir) = create_test_cache().await;

        cache.store(KEY, "first").await.unwrap();
        cache.store(KEY, "second").await.unwrap();

        assert_eq!(cache.retrieve(KEY).await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_open_creates_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b").join(".cache");

        let cache = BlobCache::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_open_evicts_entries_past_retention() {
        let (cache, temp_dir) = create_test_cache().await;
        let stale_key = format!("{KEY}-stale");
        let fresh_key = format!("{KEY}-fresh");

        cache.store(&stale_key, "old log").await.unwrap();
        cache.store(&fresh_key, "recent log").await.unwrap();
        age_file(&cache.entry_path(&stale_key), 22);
        age_file(&cache.entry_path(&fresh_key), 20);

        let reopened = BlobCache::open(temp_dir.path().join("cache")).await.unwrap();

        assert!(reopened.retrieve(&stale_key).await.unwrap().is_none());
        assert_eq!(
            reopened.retrieve(&fresh_key).await.unwrap().as_deref(),
            Some("recent log")
        );
    }

    #[tokio::test]
    async fn test_sweep_ignores_subdirectories() {
        let (cache, temp_dir) = create_test_cache().await;
        let nested = cache.dir().join("nested");
        fs::create_dir(&nested).unwrap();

        BlobCache::open_with_retention(temp_dir.path().join("cache"), Duration::ZERO)
            .await
            .unwrap();

        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let (cache, _temp_dir) = create_test_cache().await;

        cache.store(KEY, "body").await.unwrap();

        for entry in fs::read_dir(cache.dir()).unwrap() {
            let name = entry.unwrap().file_name();
            let name_str = name.to_string_lossy();
            assert!(
                !name_str.ends_with(".tmp"),
                "Temp file should not remain: {}",
                name_str
            );
        }
    }
}
