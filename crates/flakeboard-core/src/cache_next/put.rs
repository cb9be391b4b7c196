//! Cache write path.

use tracing::debug;

use crate::error::FlakeResult;

use super::super::BlobCache;
use super::io;

pub(crate) async fn store_impl(cache: &BlobCache, key: &str, value: &str) -> FlakeResult<()> {
    let path = cache.entry_path(key);
    io::write_atomic_impl(&path, value).await?;
    debug!(key, bytes = value.len(), path = %path.display(), "cached log body");
    Ok(())
}
