//! Blob cache internals: `cache.rs` is the public facade.

pub(crate) mod evict;
pub(crate) mod io;
pub(crate) mod keys;
pub(crate) mod put;
pub(crate) mod read;
