//! # Core Domain Entities
//!
//! Defines the election entities shared across subsystems.
//!
//! ## Clusters
//!
//! - **Sessions**: `VotingSession`, `SessionStatus`
//! - **Authorization**: `VotePermit`, `PermitState`, `Vote`, `VoteTarget`
//! - **Reference Data**: `Candidate`, `PollWorker`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a voting session.
    SessionId
);
id_newtype!(
    /// Identifier of a candidate within a session.
    CandidateId
);
id_newtype!(
    /// Identifier of a poll worker within a session.
    PollWorkerId
);
id_newtype!(
    /// Identifier of a vote permit.
    PermitId
);
id_newtype!(
    /// Identifier of a recorded vote.
    VoteId
);

// =============================================================================
// CLUSTER A: SESSIONS
// =============================================================================

/// Lifecycle status of a voting session.
///
/// Transitions are monotonic: `Planned` → `InProgress` → `Closed`.
/// No transition skips a stage or reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created but not yet accepting permits or votes.
    Planned,
    /// Open: permits may be issued and votes cast.
    InProgress,
    /// Finished: nothing may be issued or cast.
    Closed,
}

impl SessionStatus {
    /// Whether a transition from `self` to `next` is a legal single step.
    #[must_use]
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Planned, SessionStatus::InProgress)
                | (SessionStatus::InProgress, SessionStatus::Closed)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::Planned => "planned",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// A voting session: one election run with its own candidates, permits
/// and votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSession {
    /// Session identifier.
    pub id: SessionId,
    /// Human-facing session code (unique across sessions, e.g. "2025.1").
    pub code: String,
    /// Number of votes the organizers expect.
    pub expected_votes: u32,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Set when the session transitions to `InProgress`.
    pub start_time: Option<DateTime<Utc>>,
    /// Set when the session transitions to `Closed`.
    pub end_time: Option<DateTime<Utc>>,
}

impl VotingSession {
    /// Whether the session currently accepts permit issuance and votes.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::InProgress
    }
}

// =============================================================================
// CLUSTER B: AUTHORIZATION
// =============================================================================

/// A single-use authorization permit allowing one vote in one session.
///
/// Invariants:
/// - `token` is unique across all permits.
/// - `(session_id, registration)` is unique: one permit per voter per session.
/// - `used` flips `false` → `true` exactly once; `used_at` is set only with
///   that flip. A permit is never reverted and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePermit {
    /// Permit identifier.
    pub id: PermitId,
    /// Opaque, unguessable, URL-safe token handed to the voter.
    pub token: String,
    /// Owning session.
    pub session_id: SessionId,
    /// Voter registration string the permit was issued against.
    pub registration: String,
    /// When the permit was issued.
    pub issued_at: DateTime<Utc>,
    /// Whether the permit has been consumed by a vote.
    pub used: bool,
    /// When the permit was consumed; `None` while `used` is false.
    pub used_at: Option<DateTime<Utc>>,
}

impl VotePermit {
    /// The permit's position in its two-state machine.
    #[must_use]
    pub fn state(&self) -> PermitState {
        if self.used {
            PermitState::Consumed
        } else {
            PermitState::Issued
        }
    }
}

/// Permit state machine: `Issued` → `Consumed`. `Consumed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermitState {
    /// Issued and not yet consumed (`used == false`).
    Issued,
    /// Consumed by exactly one vote (`used == true`).
    Consumed,
}

/// What a ballot is cast for: a candidate, or a deliberate blank vote.
///
/// A blank (null) vote is a valid ballot, distinct from an invalid or
/// missing candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteTarget {
    /// Vote for a specific candidate.
    Candidate(CandidateId),
    /// Deliberate blank ballot.
    Blank,
}

impl VoteTarget {
    /// Builds a target from the request pair (`candidate_id`, `null_vote`).
    ///
    /// Returns `None` when the pair is ambiguous: both present, or neither.
    #[must_use]
    pub fn from_parts(candidate_id: Option<CandidateId>, null_vote: bool) -> Option<Self> {
        match (candidate_id, null_vote) {
            (Some(candidate), false) => Some(VoteTarget::Candidate(candidate)),
            (None, true) => Some(VoteTarget::Blank),
            _ => None,
        }
    }

    /// The candidate id, if this is a candidate vote.
    #[must_use]
    pub fn candidate_id(&self) -> Option<CandidateId> {
        match self {
            VoteTarget::Candidate(id) => Some(*id),
            VoteTarget::Blank => None,
        }
    }

    /// Whether this is a blank ballot.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, VoteTarget::Blank)
    }
}

/// A recorded vote. Immutable once created.
///
/// Invariant: `permit_id` is unique across votes, and the referenced
/// permit's `used` flag was flipped as part of creating this very vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Vote identifier.
    pub id: VoteId,
    /// Session the vote belongs to.
    pub session_id: SessionId,
    /// Candidate voted for; `None` encodes a blank ballot.
    pub candidate_id: Option<CandidateId>,
    /// The consumed permit that authorized this vote.
    pub permit_id: PermitId,
    /// When the vote was recorded.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER C: REFERENCE DATA
// =============================================================================

/// A candidate standing in a session. Managed by the CRUD layer; the core
/// reads it only to validate a ballot's candidate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate identifier.
    pub id: CandidateId,
    /// Session the candidate stands in.
    pub session_id: SessionId,
    /// Display name.
    pub name: String,
    /// Registration string of the candidate.
    pub registration: String,
    /// Commission number the candidate runs for.
    pub commission_number: String,
}

/// A poll worker assigned to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollWorker {
    /// Poll worker identifier.
    pub id: PollWorkerId,
    /// Session the worker is assigned to.
    pub session_id: SessionId,
    /// Display name.
    pub name: String,
    /// Registration string of the worker.
    pub registration: String,
}
