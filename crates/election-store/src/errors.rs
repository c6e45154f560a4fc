//! Store error types.
//!
//! Each variant names the constraint or fault that rejected the operation.

use shared_types::{CandidateId, SessionId, SessionStatus};
use thiserror::Error;

/// Errors returned by the election store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A session with this code already exists.
    #[error("Session code already exists: {0}")]
    DuplicateSessionCode(String),

    /// No session with this id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The requested status change is not a legal single step.
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// No candidate with this id.
    #[error("Candidate not found: {0}")]
    CandidateNotFound(CandidateId),

    /// A permit already exists for this registration in this session.
    #[error("Permit already exists for registration {registration} in session {session_id}")]
    DuplicateRegistration {
        session_id: SessionId,
        registration: String,
    },

    /// A permit with this token already exists.
    #[error("Permit token collision")]
    DuplicateToken,

    /// No permit with this token.
    #[error("Permit not found")]
    PermitNotFound,

    /// The permit was already consumed by an earlier vote.
    #[error("Permit already used")]
    PermitAlreadyUsed,

    /// The snapshot file failed its magic, version or decode checks.
    #[error("Snapshot corrupted: {0}")]
    SnapshotCorrupted(String),

    /// Underlying filesystem failure while persisting or loading.
    #[error("Persistence I/O failure: {0}")]
    Io(String),
}
