//! Redis-backed store.

use super::{effective_ttl_secs, KeyValueStore};
use crate::status::{ConnectionStatus, StoreEvent};
use crate::{CacheError, CacheResult};
use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client, RedisResult};
use async_trait::async_trait;
use cvgen_resilience::RetryPolicy;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on a single connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Keys requested per SCAN round trip.
const SCAN_BATCH: usize = 100;

/// Store backed by one shared, multiplexed Redis connection.
///
/// Commands are never queued while the connection is down: a failing
/// command fails immediately, flips the shared status to `Failed` and
/// starts a single background re-establishment.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    status: Arc<ConnectionStatus>,
    policy: RetryPolicy,
    reconnecting: Arc<AtomicBool>,
}

impl RedisStore {
    /// Connects to `url`, retrying with `policy`.
    ///
    /// Lifecycle events are reported to `status` whether or not the
    /// connection succeeds.
    pub async fn connect(
        url: &str,
        policy: RetryPolicy,
        status: Arc<ConnectionStatus>,
    ) -> CacheResult<Self> {
        status.apply(&StoreEvent::Connect);

        let client = match Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                status.apply(&StoreEvent::Error(e.to_string()));
                return Err(CacheError::Redis(e));
            }
        };

        let connected = policy
            .execute(|| {
                let client = client.clone();
                async move {
                    match tokio::time::timeout(CONNECT_TIMEOUT, open_manager(client)).await {
                        Ok(result) => result.map_err(CacheError::from),
                        Err(_) => Err(CacheError::Connection(format!(
                            "connection attempt timed out after {}s",
                            CONNECT_TIMEOUT.as_secs()
                        ))),
                    }
                }
            })
            .await;

        match connected {
            Ok(manager) => {
                status.apply(&StoreEvent::Ready);
                info!("Redis cache store connected");
                Ok(Self {
                    manager,
                    status,
                    policy,
                    reconnecting: Arc::new(AtomicBool::new(false)),
                })
            }
            Err(e) => {
                status.apply(&StoreEvent::Error(e.to_string()));
                Err(CacheError::Connection(e.to_string()))
            }
        }
    }

    /// Converts a command result, reacting to connection-level failures.
    fn observe<T>(&self, result: RedisResult<T>) -> CacheResult<T> {
        result.map_err(|e| {
            let err = CacheError::from(e);
            if err.is_connection_error() {
                self.on_connection_lost(&err);
            }
            err
        })
    }

    /// Marks the store failed and starts one background re-establishment.
    ///
    /// Returns false when a re-establishment is already running or there is
    /// no runtime to run it on.
    fn on_connection_lost(&self, err: &CacheError) -> bool {
        self.status.apply(&StoreEvent::Error(err.to_string()));

        if self.reconnecting.swap(true, Ordering::SeqCst) {
            return false;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.reconnecting.store(false, Ordering::SeqCst);
            return false;
        };

        let manager = self.manager.clone();
        let status = Arc::clone(&self.status);
        let policy = self.policy.clone();
        let reconnecting = Arc::clone(&self.reconnecting);

        handle.spawn(async move {
            status.apply(&StoreEvent::Connect);
            let result = policy
                .execute(|| {
                    let mut conn = manager.clone();
                    async move { ping(&mut conn).await }
                })
                .await;

            match result {
                Ok(()) => {
                    status.apply(&StoreEvent::Ready);
                }
                Err(e) => {
                    warn!(error = %e, "Redis cache store did not come back, staying unavailable");
                    status.apply(&StoreEvent::Error(e.to_string()));
                }
            }
            reconnecting.store(false, Ordering::SeqCst);
        });
        true
    }
}

async fn ping(conn: &mut ConnectionManager) -> RedisResult<()> {
    ::redis::cmd("PING").query_async::<String>(conn).await?;
    Ok(())
}

async fn open_manager(client: Client) -> RedisResult<ConnectionManager> {
    // Retries belong to the caller's policy, not the manager.
    let mut manager = ConnectionManager::new_with_backoff(client, 2, 100, 0).await?;
    ping(&mut manager).await?;
    Ok(manager)
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("state", &self.status.state())
            .field("policy", &self.policy)
            .field("reconnecting", &self.reconnecting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = self.observe(conn.get(key).await)?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let ttl_secs = effective_ttl_secs(ttl);
        self.observe(conn.set_ex::<_, _, ()>(key, value, ttl_secs).await)?;
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch) = self.observe(
                ::redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async::<(u64, Vec<String>)>(&mut conn)
                    .await,
            )?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        debug!(pattern, count = keys.len(), "Scanned cache keys");
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.manager.clone();
        let deleted: u64 = self.observe(conn.del(keys).await)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectionState;
    use std::net::SocketAddr;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// In-process RESP endpoint: PING answers PONG, GET answers nil and
    /// every other command answers OK.
    struct FakeRedis {
        addr: SocketAddr,
        accept: JoinHandle<()>,
        connections: Arc<parking_lot::Mutex<Vec<JoinHandle<()>>>>,
    }

    impl FakeRedis {
        async fn start(addr: SocketAddr) -> Self {
            let listener = TcpListener::bind(addr).await.unwrap();
            let addr = listener.local_addr().unwrap();
            let connections = Arc::new(parking_lot::Mutex::new(Vec::new()));
            let tracked = Arc::clone(&connections);
            let accept = tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    tracked.lock().push(tokio::spawn(serve(socket)));
                }
            });
            Self {
                addr,
                accept,
                connections,
            }
        }

        fn url(&self) -> String {
            format!("redis://{}", self.addr)
        }

        /// Closes the listener and every accepted connection.
        async fn stop(self) {
            self.accept.abort();
            let _ = self.accept.await;
            let connections: Vec<_> = self.connections.lock().drain(..).collect();
            for connection in connections {
                connection.abort();
                let _ = connection.await;
            }
        }
    }

    async fn serve(socket: TcpStream) {
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        while let Some(command) = read_command(&mut reader).await {
            let reply: &[u8] = match command.first().map(|c| c.to_ascii_uppercase()).as_deref() {
                Some("PING") => b"+PONG\r\n",
                Some("GET") => b"$-1\r\n",
                _ => b"+OK\r\n",
            };
            if write.write_all(reply).await.is_err() {
                return;
            }
        }
    }

    async fn read_command<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut buf = vec![0; len + 2];
            reader.read_exact(&mut buf).await.ok()?;
            buf.truncate(len);
            args.push(String::from_utf8(buf).ok()?);
        }
        Some(args)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached within 10s");
    }

    fn local_any() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn test_invalid_url_marks_failed() {
        let status = Arc::new(ConnectionStatus::connecting());
        let result = RedisStore::connect(
            "not-a-url",
            RetryPolicy::connection_default(),
            Arc::clone(&status),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(status.state(), ConnectionState::Failed);
        assert!(status.last_error().is_some());
    }

    #[tokio::test]
    async fn test_refused_connection_marks_failed() {
        let status = Arc::new(ConnectionStatus::connecting());
        let policy = RetryPolicy::linear(2, Duration::from_millis(1), Duration::from_millis(1));
        let result = RedisStore::connect("redis://127.0.0.1:1", policy, Arc::clone(&status)).await;

        assert!(matches!(result, Err(CacheError::Connection(_))));
        assert_eq!(status.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_dropped_connection_fails_then_recovers() {
        let server = FakeRedis::start(local_any()).await;
        let addr = server.addr;
        let status = Arc::new(ConnectionStatus::connecting());
        let policy = RetryPolicy::linear(50, Duration::from_millis(20), Duration::from_millis(20));
        let store = RedisStore::connect(&server.url(), policy, Arc::clone(&status))
            .await
            .unwrap();
        assert_eq!(status.state(), ConnectionState::Ready);
        assert!(store.get("k").await.unwrap().is_none());

        server.stop().await;
        assert!(store.get("k").await.is_err());
        assert_eq!(status.state(), ConnectionState::Failed);
        assert!(store.reconnecting.load(Ordering::SeqCst));

        let server = FakeRedis::start(addr).await;
        wait_until(|| status.state() == ConnectionState::Ready).await;
        assert!(!store.reconnecting.load(Ordering::SeqCst));
        assert!(store.get("k").await.unwrap().is_none());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_exhausted_reestablishment_stays_failed() {
        let server = FakeRedis::start(local_any()).await;
        let status = Arc::new(ConnectionStatus::connecting());
        let policy = RetryPolicy::linear(2, Duration::from_millis(5), Duration::from_millis(5));
        let store = RedisStore::connect(&server.url(), policy, Arc::clone(&status))
            .await
            .unwrap();

        server.stop().await;
        assert!(store.get("k").await.is_err());
        assert_eq!(status.state(), ConnectionState::Failed);

        wait_until(|| !store.reconnecting.load(Ordering::SeqCst)).await;
        assert_eq!(status.state(), ConnectionState::Failed);
        assert!(!status.is_available());
    }

    #[tokio::test]
    async fn test_single_reestablishment_in_flight() {
        let server = FakeRedis::start(local_any()).await;
        let status = Arc::new(ConnectionStatus::connecting());
        let policy = RetryPolicy::linear(3, Duration::from_millis(5), Duration::from_millis(5));
        let store = RedisStore::connect(&server.url(), policy, Arc::clone(&status))
            .await
            .unwrap();
        let err = CacheError::Connection("connection reset".to_string());

        assert!(store.on_connection_lost(&err));
        assert!(!store.on_connection_lost(&err));
        assert_eq!(status.state(), ConnectionState::Failed);

        // The endpoint never went away, so the first PING brings it back.
        wait_until(|| !store.reconnecting.load(Ordering::SeqCst)).await;
        assert_eq!(status.state(), ConnectionState::Ready);

        assert!(store.on_connection_lost(&err));
        server.stop().await;
    }
}
