//! # Permit Store Adapter
//!
//! Adapts the durable election store onto the subsystem's outbound ports.
//!
//! The adapter translates store constraint violations into port errors; it
//! adds no logic of its own. Atomicity lives in the store — the adapter
//! never wraps a check around a write.

use crate::ports::{
    DirectoryError, PermitStore, PermitStoreError, SessionDirectory,
};
use async_trait::async_trait;
use election_store::{ElectionStore, StoreError};
use shared_types::{Candidate, CandidateId, SessionId, Vote, VotePermit, VoteTarget, VotingSession};
use std::sync::Arc;

/// Adapter for the permit table.
pub struct PermitStoreAdapter {
    store: Arc<ElectionStore>,
}

impl PermitStoreAdapter {
    /// Wraps a store handle.
    #[must_use]
    pub fn new(store: Arc<ElectionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PermitStore for PermitStoreAdapter {
    async fn create(
        &self,
        session_id: SessionId,
        registration: &str,
        token: &str,
    ) -> Result<VotePermit, PermitStoreError> {
        self.store
            .create_permit(session_id, registration, token)
            .map_err(|e| match e {
                StoreError::DuplicateRegistration { .. } => PermitStoreError::DuplicateRegistration,
                other => PermitStoreError::Backend(other.to_string()),
            })
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<VotePermit>, PermitStoreError> {
        Ok(self.store.permit_by_token(token))
    }

    async fn consume(&self, token: &str, target: VoteTarget) -> Result<Vote, PermitStoreError> {
        self.store.consume_permit(token, target).map_err(|e| match e {
            StoreError::PermitNotFound => PermitStoreError::NotFound,
            StoreError::PermitAlreadyUsed => PermitStoreError::AlreadyUsed,
            other => PermitStoreError::Backend(other.to_string()),
        })
    }
}

/// Read-only adapter for session and candidate reference data.
pub struct DirectoryAdapter {
    store: Arc<ElectionStore>,
}

impl DirectoryAdapter {
    /// Wraps a store handle.
    #[must_use]
    pub fn new(store: Arc<ElectionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionDirectory for DirectoryAdapter {
    async fn session(&self, id: SessionId) -> Result<Option<VotingSession>, DirectoryError> {
        Ok(self.store.session(id))
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, DirectoryError> {
        Ok(self.store.candidate(id))
    }
}

/// Builds a manager-ready (permit store, directory) pair over one store.
#[must_use]
pub fn adapt(
    store: &Arc<ElectionStore>,
) -> (Arc<PermitStoreAdapter>, Arc<DirectoryAdapter>) {
    (
        Arc::new(PermitStoreAdapter::new(Arc::clone(store))),
        Arc::new(DirectoryAdapter::new(Arc::clone(store))),
    )
}
