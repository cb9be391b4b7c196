//! Cache read path.

use tracing::debug;

use crate::error::FlakeResult;

use super::super::BlobCache;
use super::io;

pub(crate) async fn retrieve_impl(cache: &BlobCache, key: &str) -> FlakeResult<Option<String>> {
    let path = cache.entry_path(key);
    let body = io::read_optional_impl(&path).await?;

    match &body {
        Some(b) => debug!(key, bytes = b.len(), "cache hit"),
        None => debug!(key, "cache miss"),
    }
    Ok(body)
}
