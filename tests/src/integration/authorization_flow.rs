//! # Authorization Flow Tests
//!
//! End-to-end permit and vote flows over the real election store, wired
//! through the real store adapters into the Authorization Manager.

#[cfg(test)]
mod tests {
    use election_store::ElectionStore;
    use shared_types::{AuthorizationError, CandidateId, SessionId, SessionStatus};
    use std::sync::Arc;
    use vote_authorization::{adapt, AuthorizationManager, ChannelRegistry};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Harness {
        store: Arc<ElectionStore>,
        manager: AuthorizationManager,
    }

    /// Store plus manager over the real adapters.
    fn harness() -> Harness {
        let store = Arc::new(ElectionStore::in_memory());
        let (permits, directory) = adapt(&store);
        let manager =
            AuthorizationManager::new(permits, directory, Arc::new(ChannelRegistry::new()));
        Harness { store, manager }
    }

    fn open_session(harness: &Harness, code: &str) -> SessionId {
        let session = harness.store.create_session(code, 10).unwrap();
        harness.store.start_session(session.id).unwrap();
        session.id
    }

    fn add_candidate(harness: &Harness, session_id: SessionId, name: &str) -> CandidateId {
        harness
            .store
            .add_candidate(session_id, name, "900", "C-01")
            .unwrap()
            .id
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    /// Issue for "123" succeeds; a second issue for "123" is rejected; the
    /// token votes once for C1; the same token cannot vote again.
    #[tokio::test]
    async fn permit_lifecycle_end_to_end() {
        let h = harness();
        let session_id = open_session(&h, "2025.1");
        let c1 = add_candidate(&h, session_id, "Alice");

        let issued = h.manager.issue_permit(session_id, "123").await.unwrap();

        assert_eq!(
            h.manager.issue_permit(session_id, "123").await,
            Err(AuthorizationError::RegistrationAlreadyUsed)
        );

        let vote = h
            .manager
            .cast_vote(session_id, &issued.token, Some(c1), false)
            .await
            .unwrap();
        assert_eq!(vote.candidate_id, Some(c1));

        assert_eq!(
            h.manager
                .cast_vote(session_id, &issued.token, Some(c1), false)
                .await,
            Err(AuthorizationError::TokenAlreadyConsumed)
        );

        // Exactly one vote row, referencing the consumed permit.
        assert_eq!(h.store.vote_count(session_id), 1);
        let permit = h.store.permit_by_token(&issued.token).unwrap();
        assert!(permit.used);
        let stored = h.store.vote(vote.id).unwrap();
        assert_eq!(stored.permit_id, permit.id);
    }

    #[tokio::test]
    async fn null_vote_on_a_fresh_token() {
        let h = harness();
        let session_id = open_session(&h, "2025.1");
        add_candidate(&h, session_id, "Alice");

        let issued = h.manager.issue_permit(session_id, "123").await.unwrap();
        let vote = h
            .manager
            .cast_vote(session_id, &issued.token, None, true)
            .await
            .unwrap();

        assert_eq!(vote.candidate_id, None);
        let stored = h.store.vote(vote.id).unwrap();
        assert_eq!(stored.candidate_id, None);

        // Blank ballots count toward the total but not toward any candidate.
        assert_eq!(h.store.vote_count(session_id), 1);
        let tally = h.store.tally(session_id).unwrap();
        assert!(tally.iter().all(|(_, count)| *count == 0));
    }

    #[tokio::test]
    async fn unknown_tokens_are_rejected() {
        let h = harness();
        let session_id = open_session(&h, "2025.1");

        assert_eq!(
            h.manager
                .cast_vote(session_id, "no-such-token", None, true)
                .await,
            Err(AuthorizationError::InvalidToken)
        );
        assert_eq!(h.store.vote_count(session_id), 0);
    }

    #[tokio::test]
    async fn issuing_fails_on_every_non_open_status() {
        let h = harness();
        let planned = h.store.create_session("2025.1", 10).unwrap();
        assert_eq!(
            h.manager.issue_permit(planned.id, "123").await,
            Err(AuthorizationError::SessionNotOpen)
        );

        h.store.start_session(planned.id).unwrap();
        h.store.close_session(planned.id).unwrap();
        assert_eq!(
            h.store.session(planned.id).unwrap().status,
            SessionStatus::Closed
        );
        assert_eq!(
            h.manager.issue_permit(planned.id, "123").await,
            Err(AuthorizationError::SessionNotOpen)
        );
    }

    /// A failed cast leaves the permit untouched and spendable.
    #[tokio::test]
    async fn rejected_casts_do_not_consume_the_permit() {
        let h = harness();
        let session_id = open_session(&h, "2025.1");
        let issued = h.manager.issue_permit(session_id, "123").await.unwrap();

        // Invalid candidate, then ambiguous target: both rejected.
        assert_eq!(
            h.manager
                .cast_vote(session_id, &issued.token, Some(CandidateId(99)), false)
                .await,
            Err(AuthorizationError::InvalidCandidate)
        );
        assert_eq!(
            h.manager
                .cast_vote(session_id, &issued.token, None, false)
                .await,
            Err(AuthorizationError::AmbiguousVoteTarget)
        );

        // The permit is still unused and can be spent.
        assert!(!h.store.permit_by_token(&issued.token).unwrap().used);
        h.manager
            .cast_vote(session_id, &issued.token, None, true)
            .await
            .unwrap();
    }

    /// Permits and votes survive a store restart; constraints still hold.
    #[tokio::test]
    async fn state_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("election.dat");

        let (session_id, token) = {
            let store = Arc::new(ElectionStore::open(&path).unwrap());
            let (permits, directory) = adapt(&store);
            let manager =
                AuthorizationManager::new(permits, directory, Arc::new(ChannelRegistry::new()));

            let session = store.create_session("2025.1", 10).unwrap();
            store.start_session(session.id).unwrap();
            let issued = manager.issue_permit(session.id, "123").await.unwrap();
            manager
                .cast_vote(session.id, &issued.token, None, true)
                .await
                .unwrap();
            (session.id, issued.token)
        };

        let store = Arc::new(ElectionStore::open(&path).unwrap());
        let (permits, directory) = adapt(&store);
        let manager =
            AuthorizationManager::new(permits, directory, Arc::new(ChannelRegistry::new()));

        // The consumed permit stays consumed across the restart.
        assert_eq!(
            manager.cast_vote(session_id, &token, None, true).await,
            Err(AuthorizationError::TokenAlreadyConsumed)
        );
        // And the registration stays taken.
        assert_eq!(
            manager.issue_permit(session_id, "123").await,
            Err(AuthorizationError::RegistrationAlreadyUsed)
        );
        assert_eq!(store.vote_count(session_id), 1);
    }
}
