//! Request and response bodies for the REST surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    Candidate, CandidateId, PollWorker, PollWorkerId, SessionId, SessionStatus, VoteId,
    VotingSession,
};

/// Body for `POST /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreate {
    /// Human-facing session code, e.g. "2025.1".
    pub code: String,
    /// Number of votes the organizers expect.
    #[serde(default)]
    pub expected_votes: u32,
}

/// A session as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRead {
    pub id: SessionId,
    pub code: String,
    pub expected_votes: u32,
    pub status: SessionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<VotingSession> for SessionRead {
    fn from(s: VotingSession) -> Self {
        Self {
            id: s.id,
            code: s.code,
            expected_votes: s.expected_votes,
            status: s.status,
            start_time: s.start_time,
            end_time: s.end_time,
        }
    }
}

/// A session plus its progress counters, for the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub session: SessionRead,
    /// Votes recorded so far (blank ballots included).
    pub total_votes: u64,
    /// Expected votes still outstanding, floored at zero.
    pub remaining_expected_votes: u64,
}

impl SessionOverview {
    /// Combines a session with its current vote count.
    #[must_use]
    pub fn new(session: VotingSession, total_votes: u64) -> Self {
        let remaining = u64::from(session.expected_votes).saturating_sub(total_votes);
        Self {
            session: session.into(),
            total_votes,
            remaining_expected_votes: remaining,
        }
    }
}

/// Body for `POST /api/sessions/{id}/candidates`.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateCreate {
    pub name: String,
    pub registration: String,
    pub commission_number: String,
}

/// A candidate as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRead {
    pub id: CandidateId,
    pub name: String,
    pub registration: String,
    pub commission_number: String,
}

impl From<Candidate> for CandidateRead {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name,
            registration: c.registration,
            commission_number: c.commission_number,
        }
    }
}

/// Body for `POST /api/sessions/{id}/poll_workers`.
#[derive(Debug, Clone, Deserialize)]
pub struct PollWorkerCreate {
    pub name: String,
    pub registration: String,
}

/// A poll worker as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PollWorkerRead {
    pub id: PollWorkerId,
    pub name: String,
    pub registration: String,
}

impl From<PollWorker> for PollWorkerRead {
    fn from(w: PollWorker) -> Self {
        Self {
            id: w.id,
            name: w.name,
            registration: w.registration,
        }
    }
}

/// Body for `POST /api/sessions/{id}/permits`.
#[derive(Debug, Clone, Deserialize)]
pub struct PermitCreate {
    /// Voter registration string the permit is issued against.
    pub registration: String,
}

/// The issued permit handed back to the poll worker: token and timestamp
/// only, never the registration or used state.
#[derive(Debug, Clone, Serialize)]
pub struct PermitRead {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

/// Body for `POST /api/sessions/{id}/votes`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    /// The permit token authorizing this ballot.
    pub permit_token: String,
    /// Candidate voted for; omit for a blank ballot.
    #[serde(default)]
    pub candidate_id: Option<CandidateId>,
    /// Explicit blank-ballot marker.
    #[serde(default)]
    pub null_vote: bool,
}

/// A recorded vote as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct VoteRead {
    pub id: VoteId,
    pub candidate_id: Option<CandidateId>,
    pub created_at: DateTime<Utc>,
}

/// One row of the results listing.
#[derive(Debug, Clone, Serialize)]
pub struct VoteSummary {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub total_votes: u64,
}
