//! # Channel Registry
//!
//! Per-session registry of authorization channels. Channels are created
//! lazily on first connection or first event for a session and live for the
//! process lifetime; disconnect handling is membership management inside
//! each channel, so no explicit teardown exists.

use crate::channel::{AuthorizationChannel, ObserverId, ObserverSink};
use dashmap::DashMap;
use shared_types::{AuthorizationEvent, SessionId};
use std::sync::Arc;
use tracing::error;

/// Registry of per-session observer channels.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<SessionId, Arc<AuthorizationChannel>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The channel for a session, created lazily.
    #[must_use]
    pub fn channel(&self, session_id: SessionId) -> Arc<AuthorizationChannel> {
        self.channels
            .entry(session_id)
            .or_insert_with(|| Arc::new(AuthorizationChannel::new()))
            .clone()
    }

    /// Registers a booth observer on a session.
    pub fn add_booth(&self, session_id: SessionId, sink: Arc<dyn ObserverSink>) -> ObserverId {
        self.channel(session_id).add_booth(sink)
    }

    /// Removes a booth observer from a session.
    pub fn remove_booth(&self, session_id: SessionId, id: ObserverId) {
        self.channel(session_id).remove_booth(id);
    }

    /// Registers a poll-worker observer on a session.
    pub fn add_poll_worker(
        &self,
        session_id: SessionId,
        sink: Arc<dyn ObserverSink>,
    ) -> ObserverId {
        self.channel(session_id).add_poll_worker(sink)
    }

    /// Removes a poll-worker observer from a session.
    pub fn remove_poll_worker(&self, session_id: SessionId, id: ObserverId) {
        self.channel(session_id).remove_poll_worker(id);
    }

    /// Broadcasts an event to a session's booth observers.
    /// Returns the number of successful deliveries.
    pub async fn broadcast_to_booths(
        &self,
        session_id: SessionId,
        event: &AuthorizationEvent,
    ) -> usize {
        match Self::encode(event) {
            Some(payload) => self.channel(session_id).broadcast_to_booths(&payload).await,
            None => 0,
        }
    }

    /// Broadcasts an event to a session's poll-worker observers.
    /// Returns the number of successful deliveries.
    pub async fn broadcast_to_poll_workers(
        &self,
        session_id: SessionId,
        event: &AuthorizationEvent,
    ) -> usize {
        match Self::encode(event) {
            Some(payload) => {
                self.channel(session_id)
                    .broadcast_to_poll_workers(&payload)
                    .await
            }
            None => 0,
        }
    }

    /// Encodes an event once per broadcast; every observer gets the same frame.
    fn encode(event: &AuthorizationEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!(error = %e, "Failed to encode authorization event");
                None
            }
        }
    }
}
