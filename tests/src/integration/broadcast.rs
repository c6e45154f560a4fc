//! # Broadcast Delivery Tests
//!
//! Observer fan-out over the channel registry, driven by real permit and
//! vote operations: who receives what, and how dead connections disappear.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use election_store::ElectionStore;
    use parking_lot::Mutex;
    use shared_types::SessionId;
    use std::sync::Arc;
    use vote_authorization::{
        adapt, AuthorizationManager, ChannelRegistry, ObserverSink, SinkError,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Sink that records every delivered frame.
    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<serde_json::Value> {
            self.frames
                .lock()
                .iter()
                .map(|f| serde_json::from_str(f).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl ObserverSink for RecordingSink {
        async fn deliver(&self, payload: &str) -> Result<(), SinkError> {
            self.frames.lock().push(payload.to_string());
            Ok(())
        }
    }

    /// Sink whose connection is gone; every delivery fails.
    struct ClosedSink;

    #[async_trait]
    impl ObserverSink for ClosedSink {
        async fn deliver(&self, _payload: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    struct Harness {
        manager: Arc<AuthorizationManager>,
        session_id: SessionId,
    }

    fn harness() -> Harness {
        let store = Arc::new(ElectionStore::in_memory());
        let session = store.create_session("2025.1", 10).unwrap();
        store.start_session(session.id).unwrap();

        let (permits, directory) = adapt(&store);
        let manager = Arc::new(AuthorizationManager::new(
            permits,
            directory,
            Arc::new(ChannelRegistry::new()),
        ));
        Harness {
            manager,
            session_id: session.id,
        }
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    #[tokio::test]
    async fn every_live_booth_sees_each_issued_permit() {
        let h = harness();
        let booths: Vec<Arc<RecordingSink>> = (0..3)
            .map(|_| {
                let sink = Arc::new(RecordingSink::default());
                h.manager.registry().add_booth(h.session_id, sink.clone());
                sink
            })
            .collect();

        let issued = h.manager.issue_permit(h.session_id, "123").await.unwrap();

        for booth in &booths {
            let frames = booth.frames();
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0]["type"], "permit_issued");
            assert_eq!(frames[0]["token"], issued.token.as_str());
            assert!(frames[0]["issued_at"].as_str().unwrap().contains("+00:00"));
        }
    }

    #[tokio::test]
    async fn stations_see_votes_and_booths_do_not() {
        let h = harness();
        let booth = Arc::new(RecordingSink::default());
        let station = Arc::new(RecordingSink::default());
        h.manager.registry().add_booth(h.session_id, booth.clone());
        h.manager
            .registry()
            .add_poll_worker(h.session_id, station.clone());

        let issued = h.manager.issue_permit(h.session_id, "123").await.unwrap();
        h.manager
            .cast_vote(h.session_id, &issued.token, None, true)
            .await
            .unwrap();

        let booth_frames = booth.frames();
        assert_eq!(booth_frames.len(), 1);
        assert_eq!(booth_frames[0]["type"], "permit_issued");

        let station_frames = station.frames();
        assert_eq!(station_frames.len(), 1);
        assert_eq!(station_frames[0]["type"], "vote_registered");
        assert_eq!(station_frames[0]["token"], issued.token.as_str());
        assert_eq!(station_frames[0]["null_vote"], true);
        assert_eq!(station_frames[0]["candidate_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn broadcast_failure_never_fails_the_operation() {
        let h = harness();
        h.manager
            .registry()
            .add_booth(h.session_id, Arc::new(ClosedSink));

        // Every observer is dead; issuance still succeeds.
        h.manager.issue_permit(h.session_id, "123").await.unwrap();
    }

    #[tokio::test]
    async fn dead_observers_miss_later_broadcasts_without_further_action() {
        let h = harness();
        let live = Arc::new(RecordingSink::default());
        h.manager.registry().add_booth(h.session_id, live.clone());
        h.manager
            .registry()
            .add_booth(h.session_id, Arc::new(ClosedSink));

        let channel = h.manager.registry().channel(h.session_id);
        assert_eq!(channel.booth_count(), 2);

        h.manager.issue_permit(h.session_id, "first").await.unwrap();
        assert_eq!(channel.booth_count(), 1);

        h.manager.issue_permit(h.session_id, "second").await.unwrap();
        assert_eq!(live.frames().len(), 2);
    }

    /// A reconnect is a fresh subscription: no backlog is replayed.
    #[tokio::test]
    async fn reconnection_starts_with_an_empty_backlog() {
        let h = harness();

        // Events fire while nobody is connected.
        h.manager.issue_permit(h.session_id, "early").await.unwrap();

        let late = Arc::new(RecordingSink::default());
        h.manager.registry().add_booth(h.session_id, late.clone());
        assert!(late.frames().is_empty());

        h.manager.issue_permit(h.session_id, "later").await.unwrap();
        let frames = late.frames();
        assert_eq!(frames.len(), 1);
    }

    /// Broadcasts are scoped per session even when several run at once.
    #[tokio::test]
    async fn sessions_do_not_leak_events_into_each_other() {
        let store = Arc::new(ElectionStore::in_memory());
        let a = store.create_session("2025.1", 10).unwrap();
        let b = store.create_session("2025.2", 10).unwrap();
        store.start_session(a.id).unwrap();
        store.start_session(b.id).unwrap();

        let (permits, directory) = adapt(&store);
        let manager = Arc::new(AuthorizationManager::new(
            permits,
            directory,
            Arc::new(ChannelRegistry::new()),
        ));

        let booth_a = Arc::new(RecordingSink::default());
        let booth_b = Arc::new(RecordingSink::default());
        manager.registry().add_booth(a.id, booth_a.clone());
        manager.registry().add_booth(b.id, booth_b.clone());

        manager.issue_permit(a.id, "123").await.unwrap();

        assert_eq!(booth_a.frames().len(), 1);
        assert!(booth_b.frames().is_empty());
    }
}
