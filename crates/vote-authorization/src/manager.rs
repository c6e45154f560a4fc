//! # Authorization Manager
//!
//! Orchestrates permit issuance and vote consumption against the permit
//! store and publishes the resulting events through the channel registry.
//!
//! The manager validates, delegates the atomic mutation to the store, and
//! broadcasts after the mutation has durably succeeded. Broadcast failures
//! are absorbed: the permit or vote already exists, so delivery is
//! best-effort notification, never part of the transactional contract.

use crate::ports::{DirectoryError, PermitStore, PermitStoreError, SessionDirectory};
use crate::registry::ChannelRegistry;
use crate::token::TokenGenerator;
use chrono::{DateTime, Utc};
use shared_types::{AuthorizationError, AuthorizationEvent, CandidateId, SessionId, VoteId, VoteTarget};
use std::sync::Arc;
use tracing::{debug, info};

/// What issuance hands back to the caller: the token and its timestamp.
/// Never the registration or the used flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPermit {
    /// The permit's opaque token.
    pub token: String,
    /// When the permit was issued.
    pub issued_at: DateTime<Utc>,
}

/// What a successful vote hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredVote {
    /// The created vote's identity.
    pub id: VoteId,
    /// The candidate voted for; `None` for a blank ballot.
    pub candidate_id: Option<CandidateId>,
    /// When the vote was recorded.
    pub created_at: DateTime<Utc>,
}

/// The Authorization Manager.
pub struct AuthorizationManager {
    permits: Arc<dyn PermitStore>,
    directory: Arc<dyn SessionDirectory>,
    registry: Arc<ChannelRegistry>,
    tokens: TokenGenerator,
}

impl AuthorizationManager {
    /// Wires a manager onto its store ports and channel registry.
    pub fn new(
        permits: Arc<dyn PermitStore>,
        directory: Arc<dyn SessionDirectory>,
        registry: Arc<ChannelRegistry>,
    ) -> Self {
        Self {
            permits,
            directory,
            registry,
            tokens: TokenGenerator::new(),
        }
    }

    /// The channel registry observers attach through.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Issues a single-use vote permit for a voter registration.
    ///
    /// # Errors
    /// - `SessionNotOpen` if the session is missing or not `InProgress`
    /// - `InvalidRegistration` for a blank registration string
    /// - `RegistrationAlreadyUsed` if a permit exists for this pair
    pub async fn issue_permit(
        &self,
        session_id: SessionId,
        registration: &str,
    ) -> Result<IssuedPermit, AuthorizationError> {
        let session = self
            .directory
            .session(session_id)
            .await
            .map_err(directory_fault)?
            .ok_or(AuthorizationError::SessionNotOpen)?;
        if !session.is_open() {
            return Err(AuthorizationError::SessionNotOpen);
        }

        let registration = registration.trim();
        if registration.is_empty() {
            return Err(AuthorizationError::InvalidRegistration);
        }

        let token = self.tokens.generate();
        let permit = self
            .permits
            .create(session_id, registration, &token)
            .await
            .map_err(|e| match e {
                PermitStoreError::DuplicateRegistration => {
                    AuthorizationError::RegistrationAlreadyUsed
                }
                other => AuthorizationError::Store(other.to_string()),
            })?;

        // The permit is durable; delivery is best-effort from here on.
        let delivered = self
            .registry
            .broadcast_to_booths(session_id, &AuthorizationEvent::permit_issued(&permit))
            .await;
        info!(
            session_id = %session_id,
            permit_id = %permit.id,
            booths = delivered,
            "Permit issued"
        );

        Ok(IssuedPermit {
            token: permit.token,
            issued_at: permit.issued_at,
        })
    }

    /// Consumes a permit and records the vote it authorizes.
    ///
    /// Exactly one of `candidate_id` or `null_vote` must be given.
    ///
    /// # Errors
    /// - `AmbiguousVoteTarget` for both-or-neither ballots (checked before
    ///   any store access)
    /// - `SessionNotOpen` if the session is missing or not `InProgress`
    /// - `InvalidToken` for an unknown token or a session mismatch
    /// - `InvalidCandidate` for a candidate outside the session
    /// - `TokenAlreadyConsumed` if the permit was already used
    pub async fn cast_vote(
        &self,
        session_id: SessionId,
        token: &str,
        candidate_id: Option<CandidateId>,
        null_vote: bool,
    ) -> Result<RegisteredVote, AuthorizationError> {
        let target = VoteTarget::from_parts(candidate_id, null_vote)
            .ok_or(AuthorizationError::AmbiguousVoteTarget)?;

        let session = self
            .directory
            .session(session_id)
            .await
            .map_err(directory_fault)?
            .ok_or(AuthorizationError::SessionNotOpen)?;
        if !session.is_open() {
            return Err(AuthorizationError::SessionNotOpen);
        }

        let permit = self
            .permits
            .find_by_token(token)
            .await
            .map_err(permit_fault)?
            .ok_or(AuthorizationError::InvalidToken)?;
        if permit.session_id != session_id {
            return Err(AuthorizationError::InvalidToken);
        }

        if let VoteTarget::Candidate(candidate_id) = target {
            let candidate = self
                .directory
                .candidate(candidate_id)
                .await
                .map_err(directory_fault)?
                .ok_or(AuthorizationError::InvalidCandidate)?;
            if candidate.session_id != session_id {
                return Err(AuthorizationError::InvalidCandidate);
            }
        }

        // The store re-checks the used flag inside its atomic unit; the
        // lookup above is advisory and decides nothing about consumption.
        let vote = self
            .permits
            .consume(token, target)
            .await
            .map_err(|e| match e {
                PermitStoreError::NotFound => AuthorizationError::InvalidToken,
                PermitStoreError::AlreadyUsed => AuthorizationError::TokenAlreadyConsumed,
                other => AuthorizationError::Store(other.to_string()),
            })?;

        let delivered = self
            .registry
            .broadcast_to_poll_workers(session_id, &AuthorizationEvent::vote_registered(token, &vote))
            .await;
        debug!(
            session_id = %session_id,
            vote_id = %vote.id,
            stations = delivered,
            "Vote registered"
        );

        Ok(RegisteredVote {
            id: vote.id,
            candidate_id: vote.candidate_id,
            created_at: vote.created_at,
        })
    }
}

fn directory_fault(e: DirectoryError) -> AuthorizationError {
    AuthorizationError::Store(e.to_string())
}

fn permit_fault(e: PermitStoreError) -> AuthorizationError {
    AuthorizationError::Store(e.to_string())
}
