//! Reference-data cache: durable key → JSON string store with no eviction.
//!
//! Only the two facet lists are stored here. Entries never expire and there is no
//! invalidation path; a value written once is served until the store is cleared
//! externally.

use crate::error::CacheError;
use dashmap::DashMap;
use std::path::Path;

pub const CENTURIES_KEY: &str = "centuries";
pub const CLASSIFICATIONS_KEY: &str = "classifications";

const CACHE_DEFAULT_PATH: &str = "./data/artscope_cache";

/// Key-value string store used by [`crate::ReferenceCatalog`].
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Sled-backed store; survives process restarts.
pub struct SledCache {
    db: sled::Db,
}

impl SledCache {
    /// Open the cache at the given path, or `./data/artscope_cache`.
    pub fn open(path: Option<impl AsRef<Path>>) -> Result<Self, CacheError> {
        let p = path
            .map(|x| x.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new(CACHE_DEFAULT_PATH).to_path_buf());
        let db = sled::open(p)?;
        Ok(Self { db })
    }

    /// Number of stored entries (for the status endpoint).
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl CacheStore for SledCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.db.get(key.as_bytes())? {
            Some(v) => Ok(Some(String::from_utf8(v.to_vec())?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-process store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
