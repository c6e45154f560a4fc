//! # Runtime Wiring Tests
//!
//! The composition root end to end: configuration → snapshot-backed store →
//! adapters → manager → gateway state, across a simulated restart.

#[cfg(test)]
mod tests {
    use api_gateway::AppState;
    use server_runtime::build_state;
    use server_runtime::config::{ServerConfig, StorageConfig};
    use shared_types::AuthorizationError;

    fn config_in(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: Some(dir.to_path_buf()),
            },
            ..ServerConfig::default()
        }
    }

    async fn run_election_round(state: &AppState) -> (shared_types::SessionId, String) {
        let session = state.store.create_session("2025.1", 10).unwrap();
        state.store.start_session(session.id).unwrap();
        let issued = state.manager.issue_permit(session.id, "123").await.unwrap();
        state
            .manager
            .cast_vote(session.id, &issued.token, None, true)
            .await
            .unwrap();
        (session.id, issued.token)
    }

    #[tokio::test]
    async fn wired_state_runs_a_full_round() {
        let state = build_state(&ServerConfig::default()).unwrap();
        let (session_id, _) = run_election_round(&state).await;
        assert_eq!(state.store.vote_count(session_id), 1);
    }

    #[tokio::test]
    async fn restart_preserves_consumed_permits() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let (session_id, token) = {
            let state = build_state(&config).unwrap();
            run_election_round(&state).await
        };

        // New process, same data dir.
        let state = build_state(&config).unwrap();
        assert_eq!(state.store.vote_count(session_id), 1);
        assert_eq!(
            state
                .manager
                .cast_vote(session_id, &token, None, true)
                .await,
            Err(AuthorizationError::TokenAlreadyConsumed)
        );
    }
}
