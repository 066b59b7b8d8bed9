//! Connection state machine.
//!
//! The state is written only by connection lifecycle events and read by
//! every cache operation. A stale read costs at most one doomed store call
//! or one unnecessary bypass.

use parking_lot::RwLock;
use std::fmt;
use tracing::{info, warn};

/// Connectivity of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No endpoint configured. Terminal.
    Unconfigured,
    /// Connection being established.
    Connecting,
    /// Store reachable; operations go through.
    Ready,
    /// Connection lost or never established; operations are bypassed.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Connecting => write!(f, "connecting"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Lifecycle signal emitted by a store connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A connection attempt started.
    Connect,
    /// The connection is usable.
    Ready,
    /// The connection failed.
    Error(String),
    /// The connection was closed.
    End,
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    last_error: Option<String>,
}

/// Shared, event-driven connection state.
#[derive(Debug)]
pub struct ConnectionStatus {
    inner: RwLock<Inner>,
}

impl ConnectionStatus {
    /// Creates a status in the given state.
    #[must_use]
    pub fn new(state: ConnectionState) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state,
                last_error: None,
            }),
        }
    }

    /// Status for a cache with no endpoint.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(ConnectionState::Unconfigured)
    }

    /// Status for a cache about to connect.
    #[must_use]
    pub fn connecting() -> Self {
        Self::new(ConnectionState::Connecting)
    }

    /// Returns the current state.
    pub fn state(&self) -> ConnectionState {
        self.inner.read().state
    }

    /// Returns true if operations should reach the store.
    pub fn is_available(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Returns the message of the most recent error event.
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Applies a lifecycle event and returns the resulting state.
    pub fn apply(&self, event: &StoreEvent) -> ConnectionState {
        let mut inner = self.inner.write();
        let previous = inner.state;

        if previous == ConnectionState::Unconfigured {
            return previous;
        }

        inner.state = match event {
            StoreEvent::Connect => {
                if previous == ConnectionState::Ready {
                    previous
                } else {
                    ConnectionState::Connecting
                }
            }
            StoreEvent::Ready => ConnectionState::Ready,
            StoreEvent::Error(message) => {
                inner.last_error = Some(message.clone());
                ConnectionState::Failed
            }
            StoreEvent::End => ConnectionState::Failed,
        };

        if inner.state != previous {
            match inner.state {
                ConnectionState::Ready => info!(from = %previous, "Cache store ready"),
                ConnectionState::Failed => warn!(
                    from = %previous,
                    error = inner.last_error.as_deref().unwrap_or("connection closed"),
                    "Cache store unavailable, bypassing cache"
                ),
                _ => info!(from = %previous, to = %inner.state, "Cache connection state changed"),
            }
        }

        inner.state
    }
}
