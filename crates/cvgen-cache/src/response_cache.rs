//! Cache-aside front for generation results.

use crate::entry::{CacheEntry, GenerationResult};
use crate::key::{user_pattern, CacheKey};
use crate::status::{ConnectionState, ConnectionStatus};
use crate::store::{KeyValueStore, RedisStore};
use crate::{CacheError, CacheResult};
use chrono::Utc;
use cvgen_config::CacheConfig;
use cvgen_core::UserId;
use cvgen_resilience::RetryPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifetime of a cached entry (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Namespace for every key owned by the cache.
pub const DEFAULT_KEY_PREFIX: &str = "cv:generation:";

/// Fixed settings of a [`ResponseCache`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Entry time-to-live.
    pub ttl: Duration,
    /// Key namespace.
    pub key_prefix: String,
    /// Connection retry policy.
    pub retry: RetryPolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            retry: RetryPolicy::connection_default(),
        }
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            key_prefix: config.key_prefix.clone(),
            retry: RetryPolicy::linear(
                config.connect_max_attempts,
                config.backoff_step(),
                config.backoff_cap(),
            ),
        }
    }
}

/// Content-addressed, TTL-bound cache of generation results.
///
/// The infallible methods ([`lookup`](Self::lookup), [`store`](Self::store),
/// [`invalidate_user`](Self::invalidate_user)) never fail: an unavailable or
/// misbehaving store reads as a miss and writes are skipped. The `try_*`
/// variants expose the underlying error.
///
/// Cloning is cheap and clones share the store handle and connection state.
#[derive(Clone)]
pub struct ResponseCache {
    store: Option<Arc<dyn KeyValueStore>>,
    status: Arc<ConnectionStatus>,
    settings: CacheSettings,
}

impl ResponseCache {
    /// A cache with no backing store. Every lookup misses.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            store: None,
            status: Arc::new(ConnectionStatus::unconfigured()),
            settings: CacheSettings::default(),
        }
    }

    /// A cache over an existing store whose connectivity is tracked by
    /// `status`.
    #[must_use]
    pub fn with_store(
        store: Arc<dyn KeyValueStore>,
        status: Arc<ConnectionStatus>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            store: Some(store),
            status,
            settings,
        }
    }

    /// Connects to the store named by `config`.
    ///
    /// Never fails: without a URL the cache is disabled for good, and a
    /// store that cannot be reached after the configured attempts leaves
    /// the cache unavailable.
    pub async fn connect(config: &CacheConfig) -> Self {
        let settings = CacheSettings::from(config);

        let Some(url) = config.connection_url() else {
            info!("Cache URL not configured, AI response caching disabled");
            return Self {
                store: None,
                status: Arc::new(ConnectionStatus::unconfigured()),
                settings,
            };
        };

        let status = Arc::new(ConnectionStatus::connecting());
        info!(tls = config.requires_tls(), "Connecting to cache store");

        match RedisStore::connect(&url, settings.retry.clone(), Arc::clone(&status)).await {
            Ok(store) => Self {
                store: Some(Arc::new(store)),
                status,
                settings,
            },
            Err(e) => {
                warn!(
                    error = %e,
                    attempts = settings.retry.max_attempts,
                    "Cache store unreachable, continuing without cache"
                );
                Self {
                    store: None,
                    status,
                    settings,
                }
            }
        }
    }

    /// Returns true if operations currently reach the store.
    pub fn is_available(&self) -> bool {
        self.store.is_some() && self.status.is_available()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.status.state()
    }

    /// Shared connection status.
    pub fn status(&self) -> &Arc<ConnectionStatus> {
        &self.status
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.settings.ttl
    }

    /// Key under which `request` from `user_id` is cached.
    pub fn key_for<R: Serialize + ?Sized>(
        &self,
        request: &R,
        user_id: &UserId,
    ) -> CacheResult<CacheKey> {
        CacheKey::derive(&self.settings.key_prefix, request, user_id)
    }

    /// Returns the cached entry for `request`, or `None` on a miss or any
    /// failure.
    pub async fn lookup<R, C, M>(&self, request: &R, user_id: &UserId) -> Option<CacheEntry<C, M>>
    where
        R: Serialize + ?Sized,
        C: DeserializeOwned,
        M: DeserializeOwned,
    {
        match self.try_lookup(request, user_id).await {
            Ok(entry) => entry,
            Err(e) => {
                log_failure("lookup", &e);
                None
            }
        }
    }

    /// Like [`lookup`](Self::lookup) but reports why nothing was returned.
    pub async fn try_lookup<R, C, M>(
        &self,
        request: &R,
        user_id: &UserId,
    ) -> CacheResult<Option<CacheEntry<C, M>>>
    where
        R: Serialize + ?Sized,
        C: DeserializeOwned,
        M: DeserializeOwned,
    {
        let store = self.available_store()?;
        let key = self.key_for(request, user_id)?;

        match store.get(key.as_str()).await? {
            Some(raw) => {
                let entry: CacheEntry<C, M> = serde_json::from_str(&raw)?;
                debug!(key = %key, "Cache hit");
                Ok(Some(entry))
            }
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Caches `result` for `request`. Failures are logged and skipped.
    pub async fn store<R, C, M>(
        &self,
        request: &R,
        user_id: &UserId,
        result: &GenerationResult<C, M>,
    ) where
        R: Serialize + ?Sized,
        C: Serialize,
        M: Serialize,
    {
        if let Err(e) = self.try_store(request, user_id, result).await {
            log_failure("store", &e);
        }
    }

    /// Like [`store`](Self::store) but returns the failure.
    pub async fn try_store<R, C, M>(
        &self,
        request: &R,
        user_id: &UserId,
        result: &GenerationResult<C, M>,
    ) -> CacheResult<()>
    where
        R: Serialize + ?Sized,
        C: Serialize,
        M: Serialize,
    {
        let store = self.available_store()?;
        let key = self.key_for(request, user_id)?;

        let entry = CacheEntry {
            content: &result.content,
            metadata: &result.metadata,
            cached_at: Utc::now(),
        };
        let raw = serde_json::to_string(&entry)?;

        store.set_ex(key.as_str(), &raw, self.settings.ttl).await?;
        debug!(key = %key, ttl_secs = self.settings.ttl.as_secs(), "Cached generation result");
        Ok(())
    }

    /// Drops every entry cached for `user_id`. Failures are logged and
    /// skipped.
    pub async fn invalidate_user(&self, user_id: &UserId) {
        if let Err(e) = self.try_invalidate_user(user_id).await {
            log_failure("invalidate_user", &e);
        }
    }

    /// Like [`invalidate_user`](Self::invalidate_user) but returns the
    /// number of entries removed.
    pub async fn try_invalidate_user(&self, user_id: &UserId) -> CacheResult<u64> {
        let store = self.available_store()?;
        let pattern = user_pattern(&self.settings.key_prefix, user_id);

        let keys = store.scan_keys(&pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted = store.delete(&keys).await?;
        info!(user_id = %user_id, deleted, "Invalidated cached generations for user");
        Ok(deleted)
    }

    fn available_store(&self) -> CacheResult<&Arc<dyn KeyValueStore>> {
        match self.status.state() {
            ConnectionState::Unconfigured => Err(CacheError::NotConfigured),
            ConnectionState::Ready => self.store.as_ref().ok_or(CacheError::Unavailable),
            ConnectionState::Connecting | ConnectionState::Failed => Err(CacheError::Unavailable),
        }
    }
}

fn log_failure(operation: &'static str, err: &CacheError) {
    if err.is_bypass() {
        debug!(operation, reason = %err, "Cache bypassed");
    } else {
        warn!(operation, error = %err, "Cache operation failed, continuing without cache");
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("state", &self.status.state())
            .field("has_store", &self.store.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
