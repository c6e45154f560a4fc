//! # Authorization Channel
//!
//! Holds the live observer handles for one session: booth terminals on one
//! side, poll-worker stations on the other.
//!
//! Broadcast takes a snapshot of the target set under a short-held lock and
//! delivers outside it, so delivery I/O never blocks membership mutation.
//! A handle whose delivery fails is removed — the channel self-heals
//! without an explicit disconnect notification.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier of one live observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    /// Generates a fresh observer id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery failure for one observer handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The underlying connection is gone; the handle must be pruned.
    #[error("observer connection closed")]
    Closed,
}

/// A send-capable handle to one live observer connection.
///
/// Implementations must not block membership operations: a slow consumer
/// should queue internally (or fail) rather than stall the caller.
#[async_trait::async_trait]
pub trait ObserverSink: Send + Sync {
    /// Delivers one already-encoded payload to the observer.
    async fn deliver(&self, payload: &str) -> Result<(), SinkError>;
}

type ObserverSet = Mutex<HashMap<ObserverId, Arc<dyn ObserverSink>>>;

/// Live observer sets for one session. Ephemeral and process-local: created
/// lazily, never persisted, never explicitly destroyed.
#[derive(Default)]
pub struct AuthorizationChannel {
    booths: ObserverSet,
    poll_workers: ObserverSet,
}

impl AuthorizationChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a booth observer. Returns its handle id.
    pub fn add_booth(&self, sink: Arc<dyn ObserverSink>) -> ObserverId {
        Self::add(&self.booths, sink)
    }

    /// Removes a booth observer, if still present.
    pub fn remove_booth(&self, id: ObserverId) {
        self.booths.lock().remove(&id);
    }

    /// Registers a poll-worker observer. Returns its handle id.
    pub fn add_poll_worker(&self, sink: Arc<dyn ObserverSink>) -> ObserverId {
        Self::add(&self.poll_workers, sink)
    }

    /// Removes a poll-worker observer, if still present.
    pub fn remove_poll_worker(&self, id: ObserverId) {
        self.poll_workers.lock().remove(&id);
    }

    /// Number of live booth observers.
    #[must_use]
    pub fn booth_count(&self) -> usize {
        self.booths.lock().len()
    }

    /// Number of live poll-worker observers.
    #[must_use]
    pub fn poll_worker_count(&self) -> usize {
        self.poll_workers.lock().len()
    }

    /// Broadcasts a payload to all booth observers.
    /// Returns the number of successful deliveries.
    pub async fn broadcast_to_booths(&self, payload: &str) -> usize {
        Self::broadcast(&self.booths, payload).await
    }

    /// Broadcasts a payload to all poll-worker observers.
    /// Returns the number of successful deliveries.
    pub async fn broadcast_to_poll_workers(&self, payload: &str) -> usize {
        Self::broadcast(&self.poll_workers, payload).await
    }

    fn add(set: &ObserverSet, sink: Arc<dyn ObserverSink>) -> ObserverId {
        let id = ObserverId::new();
        set.lock().insert(id, sink);
        id
    }

    /// Snapshot under the lock, deliver outside it, prune failed handles.
    async fn broadcast(set: &ObserverSet, payload: &str) -> usize {
        let snapshot: Vec<(ObserverId, Arc<dyn ObserverSink>)> = {
            let guard = set.lock();
            guard.iter().map(|(id, sink)| (*id, Arc::clone(sink))).collect()
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, sink) in snapshot {
            match sink.deliver(payload).await {
                Ok(()) => delivered += 1,
                Err(SinkError::Closed) => {
                    warn!(observer_id = %id, "Dropping disconnected observer");
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut guard = set.lock();
            for id in &dead {
                guard.remove(id);
            }
            debug!(pruned = dead.len(), "Pruned dead observers after broadcast");
        }

        delivered
    }
}
