//! # biolink store
//!
//! Persistence port for biolink collections.
//!
//! Each collection is a single document under a fixed key and is read and
//! written as a whole. There is no per-record granularity: loading a page
//! loads every page, saving one rewrites them all.
//!
//! Reads are forgiving. An absent or malformed document loads as an empty
//! collection (with a warning), so a damaged file never takes the site down.

mod file;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key of the pages collection
pub const PAGES_KEY: &str = "biolink_pages";

/// Key of the testimonials collection
pub const TESTIMONIALS_KEY: &str = "biolink_testimonials";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Key-value document store
pub trait Storage: Send + Sync {
    /// Raw document under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document under `key`
    fn write(&self, key: &str, document: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, document: &str) -> Result<()> {
        (**self).write(key, document)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, document: &str) -> Result<()> {
        (**self).write(key, document)
    }
}

/// Load a whole collection. Never fails: unreadable documents load as empty.
pub fn load_collection<T, S>(storage: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let document = match storage.read(key) {
        Ok(Some(document)) => document,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("could not read {}, treating as empty: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&document) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("malformed {} document, treating as empty: {}", key, e);
            Vec::new()
        }
    }
}

/// Serialize and store a whole collection
pub fn save_collection<T, S>(storage: &S, key: &str, items: &[T]) -> Result<()>
where
    T: Serialize,
    S: Storage + ?Sized,
{
    let document = serde_json::to_string(items)?;
    storage.write(key, &document)?;
    tracing::debug!("saved {} ({} records)", key, items.len());
    Ok(())
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is accepted
pub(crate) fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}
