//! Filesystem helpers for the blob cache.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use crate::error::{FlakeError, FlakeResult};

pub(crate) async fn ensure_dir_impl(dir: &Path) -> FlakeResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| FlakeError::Cache {
            message: format!("failed to create cache directory {}: {}", dir.display(), e),
        })
}

/// Reads a file; a missing file is `Ok(None)`.
pub(crate) async fn read_optional_impl(path: &Path) -> FlakeResult<Option<String>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FlakeError::Cache {
            message: format!("failed to read cache entry {}: {}", path.display(), e),
        }),
    }
}

pub(crate) async fn write_atomic_impl(path: &Path, content: &str) -> FlakeResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| FlakeError::Cache {
            message: format!("failed to write temp file: {}", e),
        })?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| FlakeError::Cache {
            message: format!("failed to rename temp file: {}", e),
        })?;

    Ok(())
}
