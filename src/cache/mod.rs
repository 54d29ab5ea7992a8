// src/cache/mod.rs
//! Read-through cache in front of the Notion API.
//!
//! Backends implement `CacheStore` over plain strings. `ReadThroughCache`
//! layers JSON encoding, the entry TTL and the failure policy on top: a
//! backend error is logged and behaves like a miss on read and a no-op on
//! write or evict.

mod memory;
mod redis_store;

pub use self::memory::MemoryCache;
pub use self::redis_store::RedisCache;

use crate::constants::{
    CACHE_PROBE_KEY, CACHE_PROBE_VALUE, COLLECTION_CACHE_KEY, PAGE_CACHE_KEY_PREFIX,
};
use crate::error::CacheError;
use crate::types::PageId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A key-value store with expiring entries.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name reported by the connectivity probe.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value`, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// A store that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait::async_trait]
impl CacheStore for DisabledCache {
    fn backend(&self) -> &'static str {
        "none"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Cache keys used by the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    /// The whole collection listing.
    Collection,
    /// One page, keyed by its dashed id.
    Page(PageId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str(COLLECTION_CACHE_KEY),
            Self::Page(id) => write!(f, "{}{}", PAGE_CACHE_KEY_PREFIX, id.to_dashed()),
        }
    }
}

/// JSON read-through layer over a `CacheStore`.
#[derive(Clone)]
pub struct ReadThroughCache {
    store: Arc<dyn CacheStore>,
    ttl: Option<Duration>,
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Option<Duration>) -> Self {
        Self { store, ttl }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Cached value for `key`, or `None` on a miss, a backend error or an
    /// entry that no longer decodes.
    pub async fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    log::debug!("Cache hit: {}", key);
                    Some(value)
                }
                Err(e) => {
                    log::warn!("Discarding undecodable cache entry '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                log::warn!("Cache read of '{}' failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    /// Stores `value` under `key` with the configured TTL. Failures are
    /// logged.
    pub async fn write<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let key = key.to_string();
        let result = match serde_json::to_string(value) {
            Ok(raw) => self.store.set(&key, &raw, self.ttl).await,
            Err(source) => Err(CacheError::Encoding {
                key: key.clone(),
                source,
            }),
        };
        match result {
            Ok(()) => log::debug!("Cached '{}'", key),
            Err(e) => log::warn!("Cache write of '{}' failed: {}", key, e),
        }
    }

    /// Removes `key`. Returns whether the eviction went through so the
    /// caller can report a stale entry.
    pub async fn evict(&self, key: &CacheKey) -> bool {
        let key = key.to_string();
        match self.store.delete(&key).await {
            Ok(()) => {
                log::debug!("Evicted '{}'", key);
                true
            }
            Err(e) => {
                log::warn!(
                    "Eviction of '{}' failed; the entry stays until it expires: {}",
                    key,
                    e
                );
                false
            }
        }
    }

    /// Writes the probe value and reads it back, surfacing backend errors.
    pub async fn probe(&self) -> Result<String, CacheError> {
        self.store
            .set(CACHE_PROBE_KEY, CACHE_PROBE_VALUE, None)
            .await?;
        self.store
            .get(CACHE_PROBE_KEY)
            .await?
            .ok_or_else(|| CacheError::NotStored {
                key: CACHE_PROBE_KEY.to_string(),
            })
    }
}
