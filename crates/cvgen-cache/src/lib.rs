//! # CVGen Cache
//!
//! Cache-aside layer in front of the language-model generation call.
//!
//! Entries are addressed by a SHA-256 digest of the canonicalized request
//! and the requesting user, stored with a fixed TTL, and scoped per user so
//! a user's entries can be invalidated exactly. Every failure of the
//! backing store degrades to a cache miss; nothing in the public
//! [`ResponseCache`] surface returns an error.

pub mod canonical;
pub mod entry;
pub mod error;
pub mod key;
mod response_cache;
pub mod status;
pub mod store;

pub use canonical::to_canonical_json;
pub use entry::{CacheEntry, GenerationResult};
pub use error::{CacheError, CacheResult};
pub use key::CacheKey;
pub use response_cache::{CacheSettings, ResponseCache, DEFAULT_KEY_PREFIX, DEFAULT_TTL};
pub use status::{ConnectionState, ConnectionStatus, StoreEvent};
pub use store::{Clock, KeyValueStore, ManualClock, MemoryStore, RedisStore, SystemClock};
