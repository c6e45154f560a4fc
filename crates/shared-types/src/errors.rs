//! # Error Types
//!
//! Defines the caller-facing authorization error taxonomy.
//!
//! Every variant is a recoverable, distinct rejection the calling layer can
//! render as its own message. None of them crash the process, and a failed
//! operation never leaves a partial state change behind.

use thiserror::Error;

/// Rejections returned by the Authorization Manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// The session does not exist or is not `InProgress`.
    #[error("Session is not open for voting")]
    SessionNotOpen,

    /// The voter registration string is blank.
    #[error("Registration must not be blank")]
    InvalidRegistration,

    /// A permit was already issued for this registration in this session.
    #[error("A permit was already issued for this registration")]
    RegistrationAlreadyUsed,

    /// The permit token is unknown or belongs to another session.
    #[error("Invalid authorization token")]
    InvalidToken,

    /// The candidate does not exist or belongs to another session.
    #[error("Invalid candidate for this session")]
    InvalidCandidate,

    /// The ballot names both a candidate and a null vote, or neither.
    #[error("Exactly one of candidate or null vote must be chosen")]
    AmbiguousVoteTarget,

    /// The permit token was already consumed by an earlier vote.
    #[error("Authorization token already used")]
    TokenAlreadyConsumed,

    /// The durable store failed; not a domain rejection.
    #[error("Store failure: {0}")]
    Store(String),
}

impl AuthorizationError {
    /// Whether this is one of the seven domain rejections (as opposed to an
    /// infrastructure fault).
    #[must_use]
    pub fn is_domain_rejection(&self) -> bool {
        !matches!(self, AuthorizationError::Store(_))
    }
}
