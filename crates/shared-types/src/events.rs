//! # Observer Events
//!
//! Defines the event payloads pushed to live observers over the per-session
//! authorization channels.
//!
//! Field names are part of the wire protocol and fixed:
//!
//! - `permit_issued`: `{type, token, issued_at}` — delivered to booths.
//! - `vote_registered`: `{type, token, used_at, candidate_id, null_vote}` —
//!   delivered to poll-worker stations; `candidate_id` is null when
//!   `null_vote` is true.
//!
//! Timestamps are RFC 3339 with an explicit UTC offset.

use crate::entities::{CandidateId, Vote, VotePermit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events broadcast over a session's authorization channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorizationEvent {
    /// A new permit was issued. Booth observers use this to admit the voter.
    PermitIssued {
        /// The permit's opaque token.
        token: String,
        /// Issuance timestamp, RFC 3339 with UTC offset.
        issued_at: String,
    },

    /// A vote was recorded against a consumed permit.
    VoteRegistered {
        /// The consumed permit's token.
        token: String,
        /// Consumption timestamp, RFC 3339 with UTC offset.
        used_at: String,
        /// The candidate voted for; null for a blank ballot.
        candidate_id: Option<CandidateId>,
        /// Whether the ballot was a deliberate blank vote.
        null_vote: bool,
    },
}

impl AuthorizationEvent {
    /// Event for a freshly issued permit.
    #[must_use]
    pub fn permit_issued(permit: &VotePermit) -> Self {
        AuthorizationEvent::PermitIssued {
            token: permit.token.clone(),
            issued_at: wire_timestamp(permit.issued_at),
        }
    }

    /// Event for a recorded vote. `used_at` comes from the vote's creation
    /// instant, which the store stamps identically onto the permit.
    #[must_use]
    pub fn vote_registered(token: &str, vote: &Vote) -> Self {
        AuthorizationEvent::VoteRegistered {
            token: token.to_string(),
            used_at: wire_timestamp(vote.created_at),
            candidate_id: vote.candidate_id,
            null_vote: vote.candidate_id.is_none(),
        }
    }
}

/// Formats a timestamp for the wire: RFC 3339 with an explicit UTC offset.
#[must_use]
pub fn wire_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}
