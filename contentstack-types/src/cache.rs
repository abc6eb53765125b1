//! Cache policy and the cache strategy interface.
//!
//! The SDK only decides *when* to consult a cache. Storage, eviction and
//! persistence are up to the [`ResponseCache`] implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// How a fetch combines the cache and the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Always hit the network; never read the cache.
    #[default]
    NetworkOnly,
    /// Only read the cache; a miss is a `CacheError::Miss`.
    CacheOnly,
    /// Read the cache, falling back to the network on a miss.
    CacheElseNetwork,
    /// Hit the network, falling back to the cache if the request fails.
    NetworkElseCache,
    /// Deliver the cached response (if any), then the network response.
    CacheThenNetwork,
}

impl CachePolicy {
    /// Returns true if the policy can deliver more than one result per fetch.
    pub const fn may_deliver_twice(self) -> bool {
        matches!(self, CachePolicy::CacheThenNetwork)
    }
}

/// Where a delivered response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
}

/// Response body cache keyed by request URL.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the cached body for `url`, if any.
    async fn get(&self, url: &str) -> Option<Vec<u8>>;

    /// Stores a successful response body for `url`.
    async fn put(&self, url: &str, body: Vec<u8>);
}

/// Unbounded in-memory cache. Entries live as long as the cache does.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached URLs.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.entries.read().await.get(url).cloned()
    }

    async fn put(&self, url: &str, body: Vec<u8>) {
        self.entries.write().await.insert(url.to_string(), body);
    }
}
