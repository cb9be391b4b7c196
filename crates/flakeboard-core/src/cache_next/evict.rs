//! Retention sweep, run once when the cache is opened.

use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{FlakeError, FlakeResult};

use super::super::BlobCache;

/// Deletes every regular file older than `retention`; returns the number removed.
pub(crate) async fn sweep_expired_impl(
    cache: &BlobCache,
    retention: Duration,
) -> FlakeResult<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    let mut entries = fs::read_dir(cache.dir())
        .await
        .map_err(|e| FlakeError::Cache {
            message: format!("failed to scan cache directory: {}", e),
        })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| FlakeError::Cache {
        message: format!("failed to scan cache directory: {}", e),
    })? {
        let path = entry.path();
        let meta = fs::metadata(&path).await.map_err(|e| FlakeError::Cache {
            message: format!("failed to stat {}: {}", path.display(), e),
        })?;
        if !meta.is_file() {
            continue;
        }

        let modified = meta.modified().map_err(|e| FlakeError::Cache {
            message: format!("failed to read mtime of {}: {}", path.display(), e),
        })?;
        // mtime in the future counts as fresh
        let age = now.duration_since(modified).unwrap_or_default();
        if age > retention {
            fs::remove_file(&path).await.map_err(|e| FlakeError::Cache {
                message: format!("failed to evict {}: {}", path.display(), e),
            })?;
            debug!(path = %path.display(), age_hours = age.as_secs() / 3600, "evicted stale cache entry");
            removed += 1;
        }
    }

    if removed > 0 {
        info!(removed, dir = %cache.dir().display(), "evicted stale cache entries");
    }
    Ok(removed)
}
