//! Backing key-value stores.

mod memory;
mod redis_store;

pub use self::memory::{Clock, ManualClock, MemoryStore, SystemClock};
pub use self::redis_store::RedisStore;

use crate::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Minimal key-value surface the response cache needs.
///
/// Values are opaque JSON strings. Expiry is enforced by the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value, expiring
    /// after `ttl` rounded down to whole seconds (never less than one).
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Returns every live key matching the glob `pattern`.
    async fn scan_keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Deletes `keys` and returns how many existed.
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;
}

/// Expiry actually applied for a requested `ttl`: whole seconds, at least one.
pub(crate) fn effective_ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
