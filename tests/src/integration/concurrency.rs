//! # Concurrency Property Tests
//!
//! The two exactly-one-success properties, exercised with real task
//! contention over the real store:
//!
//! - concurrent `cast_vote` calls on one token: one success, the rest
//!   `TokenAlreadyConsumed`
//! - concurrent `issue_permit` calls for one (session, registration) pair:
//!   one success, the rest `RegistrationAlreadyUsed`

#[cfg(test)]
mod tests {
    use election_store::ElectionStore;
    use shared_types::{AuthorizationError, SessionId};
    use std::sync::Arc;
    use tokio::sync::Barrier;
    use vote_authorization::{adapt, AuthorizationManager, ChannelRegistry};

    const CONTENDERS: usize = 16;

    fn wired_manager(store: &Arc<ElectionStore>) -> Arc<AuthorizationManager> {
        let (permits, directory) = adapt(store);
        Arc::new(AuthorizationManager::new(
            permits,
            directory,
            Arc::new(ChannelRegistry::new()),
        ))
    }

    fn open_session(store: &ElectionStore) -> SessionId {
        let session = store.create_session("2025.1", 100).unwrap();
        store.start_session(session.id).unwrap();
        session.id
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn double_spend_is_impossible_under_contention() {
        let store = Arc::new(ElectionStore::in_memory());
        let session_id = open_session(&store);
        let manager = wired_manager(&store);
        let issued = manager.issue_permit(session_id, "123").await.unwrap();

        let barrier = Arc::new(Barrier::new(CONTENDERS));
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                let token = issued.token.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    manager.cast_vote(session_id, &token, None, true).await
                })
            })
            .collect();

        let mut successes = 0;
        let mut consumed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthorizationError::TokenAlreadyConsumed) => consumed += 1,
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(consumed, CONTENDERS - 1);
        assert_eq!(store.vote_count(session_id), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn duplicate_registration_is_impossible_under_contention() {
        let store = Arc::new(ElectionStore::in_memory());
        let session_id = open_session(&store);
        let manager = wired_manager(&store);

        let barrier = Arc::new(Barrier::new(CONTENDERS));
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    manager.issue_permit(session_id, "123").await
                })
            })
            .collect();

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthorizationError::RegistrationAlreadyUsed) => duplicates += 1,
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(duplicates, CONTENDERS - 1);
    }

    /// Issuance for distinct registrations is independent: contention never
    /// rejects unrelated voters.
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn distinct_registrations_all_succeed_under_contention() {
        let store = Arc::new(ElectionStore::in_memory());
        let session_id = open_session(&store);
        let manager = wired_manager(&store);

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    manager.issue_permit(session_id, &format!("reg-{i}")).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }
}
