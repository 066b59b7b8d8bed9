//! Shared fixtures for cache integration tests.

use cvgen_cache::{
    CacheSettings, ConnectionState, ConnectionStatus, ManualClock, MemoryStore, ResponseCache,
};
use cvgen_core::UserId;
use std::sync::Arc;

/// A ready cache over an in-memory store driven by a manual clock.
pub struct TestCache {
    pub cache: ResponseCache,
    pub store: Arc<MemoryStore>,
    pub status: Arc<ConnectionStatus>,
    pub clock: ManualClock,
}

impl TestCache {
    pub fn new() -> Self {
        Self::with_settings(CacheSettings::default())
    }

    pub fn with_settings(settings: CacheSettings) -> Self {
        let clock = ManualClock::new();
        let store = Arc::new(MemoryStore::with_clock(Arc::new(clock.clone())));
        let status = Arc::new(ConnectionStatus::new(ConnectionState::Ready));
        let cache = ResponseCache::with_store(store.clone(), Arc::clone(&status), settings);

        Self {
            cache,
            store,
            status,
            clock,
        }
    }
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}
