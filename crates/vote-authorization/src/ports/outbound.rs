//! Outbound (Driven) ports for the authorization subsystem.
//!
//! These traits define what the Authorization Manager needs from the
//! durable store. The store behind them owns the uniqueness constraints and
//! the atomic consume; the manager never reproduces a read-then-write
//! sequence on top of them.

use async_trait::async_trait;
use shared_types::{Candidate, CandidateId, SessionId, Vote, VotePermit, VoteTarget, VotingSession};
use thiserror::Error;

/// Failures surfaced by the permit store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermitStoreError {
    /// A permit already exists for this (session, registration) pair.
    #[error("permit already exists for this registration")]
    DuplicateRegistration,

    /// No permit with this token.
    #[error("permit not found")]
    NotFound,

    /// The permit was already consumed.
    #[error("permit already used")]
    AlreadyUsed,

    /// The store itself failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failures surfaced by the session directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The store itself failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Access to the durable store's permit table.
#[async_trait]
pub trait PermitStore: Send + Sync {
    /// Creates a permit. The duplicate-registration check and the insert
    /// are atomic with respect to concurrent callers for the same pair.
    async fn create(
        &self,
        session_id: SessionId,
        registration: &str,
        token: &str,
    ) -> Result<VotePermit, PermitStoreError>;

    /// Looks up a permit by token.
    async fn find_by_token(&self, token: &str) -> Result<Option<VotePermit>, PermitStoreError>;

    /// Atomically consumes the permit and records the vote: verifies
    /// `used == false`, flips it with a timestamp, and inserts the vote row
    /// as one unit. At most one concurrent call per token succeeds.
    async fn consume(&self, token: &str, target: VoteTarget) -> Result<Vote, PermitStoreError>;
}

/// Read-only access to session and candidate reference data.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Looks up a session by id.
    async fn session(&self, id: SessionId) -> Result<Option<VotingSession>, DirectoryError>;

    /// Looks up a candidate by id.
    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, DirectoryError>;
}
