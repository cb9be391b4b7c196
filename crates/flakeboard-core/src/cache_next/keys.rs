//! Key → filename derivation.
//!
//! Filenames are a fixed-length slice of the RFC 4648 base-32 encoding
//! (upper-case alphabet, no padding) of the key. The slice is taken from the
//! end of the encoding: fetch keys are job URLs that share a long common
//! prefix and differ in their trailing build id.

use std::path::{Path, PathBuf};

use data_encoding::BASE32_NOPAD;

/// Number of encoded characters used as the filename.
pub(crate) const KEY_SLICE_LEN: usize = 32;

pub(crate) fn file_name_impl(key: &str) -> String {
    let encoded = BASE32_NOPAD.encode(key.as_bytes());
    let start = encoded.len().saturating_sub(KEY_SLICE_LEN);
    encoded[start..].to_string()
}

pub(crate) fn entry_path_impl(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(file_name_impl(key))
}
