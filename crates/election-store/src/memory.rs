//! # Election Store Tables
//!
//! Implements the in-process table set with its uniqueness indices.
//!
//! ## Data Structures
//!
//! - `sessions` / `candidates` / `poll_workers` / `permits` / `votes`:
//!   ordered primary tables keyed by id
//! - `session_codes`: unique index, session code → id
//! - `permits_by_token`: unique index, token → permit id
//! - `permits_by_registration`: unique index, (session, registration) → permit id
//! - `votes_by_permit`: unique index enforcing one vote per permit
//!
//! ## Invariants Enforced
//!
//! - One permit per (session, registration) pair, checked under the write lock
//! - Permit `used` flips false → true exactly once (`consume_permit`)
//! - Vote insertion and the `used` flip are one atomic unit
//! - Session status transitions are monotonic single steps

use crate::errors::StoreError;
use crate::persistence;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{
    Candidate, CandidateId, PermitId, PollWorker, PollWorkerId, SessionId, SessionStatus, Vote,
    VoteId, VotePermit, VoteTarget, VotingSession,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The full table set. Serialized wholesale into the snapshot file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    next_session_id: u64,
    next_candidate_id: u64,
    next_poll_worker_id: u64,
    next_permit_id: u64,
    next_vote_id: u64,

    sessions: BTreeMap<SessionId, VotingSession>,
    candidates: BTreeMap<CandidateId, Candidate>,
    poll_workers: BTreeMap<PollWorkerId, PollWorker>,
    permits: BTreeMap<PermitId, VotePermit>,
    votes: BTreeMap<VoteId, Vote>,

    session_codes: HashMap<String, SessionId>,
    permits_by_token: HashMap<String, PermitId>,
    permits_by_registration: HashMap<(SessionId, String), PermitId>,
    votes_by_permit: HashMap<PermitId, VoteId>,
}

impl Tables {
    fn next_id(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }
}

/// Election record store.
///
/// All mutations for one logical operation run under a single write lock,
/// which is the atomic unit the authorization core relies on. With a
/// snapshot path configured, every committed mutation is flushed to disk
/// before the lock is released.
pub struct ElectionStore {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl ElectionStore {
    /// Creates an empty, purely in-memory store (no snapshot file).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            snapshot_path: None,
        }
    }

    /// Opens a store backed by a snapshot file, loading existing records.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot exists but cannot be read or fails its magic,
    /// version or decode checks. A missing file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let tables = persistence::load(&path)?;
            info!(
                path = %path.display(),
                sessions = tables.sessions.len(),
                permits = tables.permits.len(),
                votes = tables.votes.len(),
                "Loaded election store snapshot"
            );
            tables
        } else {
            Tables::default()
        };
        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    /// Flushes the tables to the snapshot file, if one is configured.
    /// Called with the write lock held so snapshots are serialized.
    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        match &self.snapshot_path {
            Some(path) => persistence::save(path, tables),
            None => Ok(()),
        }
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    /// Creates a new session in the `Planned` state.
    ///
    /// # Errors
    /// - `DuplicateSessionCode` if the code is taken
    pub fn create_session(
        &self,
        code: &str,
        expected_votes: u32,
    ) -> Result<VotingSession, StoreError> {
        let mut tables = self.tables.write();
        if tables.session_codes.contains_key(code) {
            return Err(StoreError::DuplicateSessionCode(code.to_string()));
        }

        let id = SessionId(Tables::next_id(&mut tables.next_session_id));
        let session = VotingSession {
            id,
            code: code.to_string(),
            expected_votes,
            status: SessionStatus::Planned,
            start_time: None,
            end_time: None,
        };
        tables.session_codes.insert(code.to_string(), id);
        tables.sessions.insert(id, session.clone());
        self.persist(&tables)?;

        debug!(session_id = %id, code, "Session created");
        Ok(session)
    }

    /// Looks up a session by id.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<VotingSession> {
        self.tables.read().sessions.get(&id).cloned()
    }

    /// All sessions, ordered by id.
    #[must_use]
    pub fn sessions(&self) -> Vec<VotingSession> {
        self.tables.read().sessions.values().cloned().collect()
    }

    /// Advances a session to `InProgress` and stamps its start time.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown id
    /// - `InvalidTransition` unless the session is `Planned`
    pub fn start_session(&self, id: SessionId) -> Result<VotingSession, StoreError> {
        self.advance_session(id, SessionStatus::InProgress)
    }

    /// Advances a session to `Closed` and stamps its end time.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown id
    /// - `InvalidTransition` unless the session is `InProgress`
    pub fn close_session(&self, id: SessionId) -> Result<VotingSession, StoreError> {
        self.advance_session(id, SessionStatus::Closed)
    }

    fn advance_session(
        &self,
        id: SessionId,
        next: SessionStatus,
    ) -> Result<VotingSession, StoreError> {
        let mut tables = self.tables.write();
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;

        if !session.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: session.status,
                to: next,
            });
        }

        let now = Utc::now();
        session.status = next;
        match next {
            SessionStatus::InProgress => session.start_time = Some(now),
            SessionStatus::Closed => session.end_time = Some(now),
            SessionStatus::Planned => {}
        }
        let updated = session.clone();
        self.persist(&tables)?;

        info!(session_id = %id, status = %next, "Session transitioned");
        Ok(updated)
    }

    // =========================================================================
    // REFERENCE DATA
    // =========================================================================

    /// Adds a candidate to a session.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    pub fn add_candidate(
        &self,
        session_id: SessionId,
        name: &str,
        registration: &str,
        commission_number: &str,
    ) -> Result<Candidate, StoreError> {
        let mut tables = self.tables.write();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }

        let id = CandidateId(Tables::next_id(&mut tables.next_candidate_id));
        let candidate = Candidate {
            id,
            session_id,
            name: name.to_string(),
            registration: registration.to_string(),
            commission_number: commission_number.to_string(),
        };
        tables.candidates.insert(id, candidate.clone());
        self.persist(&tables)?;
        Ok(candidate)
    }

    /// Looks up a candidate by id.
    #[must_use]
    pub fn candidate(&self, id: CandidateId) -> Option<Candidate> {
        self.tables.read().candidates.get(&id).cloned()
    }

    /// All candidates of a session, ordered by id.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    pub fn candidates(&self, session_id: SessionId) -> Result<Vec<Candidate>, StoreError> {
        let tables = self.tables.read();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }
        Ok(tables
            .candidates
            .values()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect())
    }

    /// Adds a poll worker to a session.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    pub fn add_poll_worker(
        &self,
        session_id: SessionId,
        name: &str,
        registration: &str,
    ) -> Result<PollWorker, StoreError> {
        let mut tables = self.tables.write();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }

        let id = PollWorkerId(Tables::next_id(&mut tables.next_poll_worker_id));
        let worker = PollWorker {
            id,
            session_id,
            name: name.to_string(),
            registration: registration.to_string(),
        };
        tables.poll_workers.insert(id, worker.clone());
        self.persist(&tables)?;
        Ok(worker)
    }

    /// All poll workers of a session, ordered by id.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    pub fn poll_workers(&self, session_id: SessionId) -> Result<Vec<PollWorker>, StoreError> {
        let tables = self.tables.read();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }
        Ok(tables
            .poll_workers
            .values()
            .filter(|w| w.session_id == session_id)
            .cloned()
            .collect())
    }

    // =========================================================================
    // PERMITS & VOTES
    // =========================================================================

    /// Creates a permit for a voter registration.
    ///
    /// The duplicate-registration check and the insert run under one write
    /// lock; concurrent calls for the same pair cannot both succeed.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    /// - `DuplicateRegistration` if a permit exists for (session, registration)
    /// - `DuplicateToken` on a token collision
    pub fn create_permit(
        &self,
        session_id: SessionId,
        registration: &str,
        token: &str,
    ) -> Result<VotePermit, StoreError> {
        let mut tables = self.tables.write();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }

        let pair = (session_id, registration.to_string());
        if tables.permits_by_registration.contains_key(&pair) {
            return Err(StoreError::DuplicateRegistration {
                session_id,
                registration: registration.to_string(),
            });
        }
        if tables.permits_by_token.contains_key(token) {
            return Err(StoreError::DuplicateToken);
        }

        let id = PermitId(Tables::next_id(&mut tables.next_permit_id));
        let permit = VotePermit {
            id,
            token: token.to_string(),
            session_id,
            registration: registration.to_string(),
            issued_at: Utc::now(),
            used: false,
            used_at: None,
        };
        tables.permits_by_token.insert(token.to_string(), id);
        tables.permits_by_registration.insert(pair, id);
        tables.permits.insert(id, permit.clone());
        self.persist(&tables)?;

        debug!(session_id = %session_id, permit_id = %id, "Permit created");
        Ok(permit)
    }

    /// Looks up a permit by its token.
    #[must_use]
    pub fn permit_by_token(&self, token: &str) -> Option<VotePermit> {
        let tables = self.tables.read();
        let id = tables.permits_by_token.get(token)?;
        tables.permits.get(id).cloned()
    }

    /// Consumes a permit and records the vote as one atomic unit.
    ///
    /// Locates the permit, verifies `used == false`, flips it with a
    /// timestamp and inserts the vote row, all under one write lock.
    /// Concurrent consume calls on the same token yield exactly one success.
    ///
    /// # Errors
    /// - `PermitNotFound` for an unknown token
    /// - `PermitAlreadyUsed` if the permit was consumed before
    pub fn consume_permit(&self, token: &str, target: VoteTarget) -> Result<Vote, StoreError> {
        let mut tables = self.tables.write();
        let permit_id = *tables
            .permits_by_token
            .get(token)
            .ok_or(StoreError::PermitNotFound)?;

        let now = Utc::now();
        let (session_id, permit_id) = {
            let permit = tables
                .permits
                .get_mut(&permit_id)
                .ok_or(StoreError::PermitNotFound)?;
            if permit.used {
                return Err(StoreError::PermitAlreadyUsed);
            }
            permit.used = true;
            permit.used_at = Some(now);
            (permit.session_id, permit.id)
        };

        let vote_id = VoteId(Tables::next_id(&mut tables.next_vote_id));
        let vote = Vote {
            id: vote_id,
            session_id,
            candidate_id: target.candidate_id(),
            permit_id,
            created_at: now,
        };
        tables.votes_by_permit.insert(permit_id, vote_id);
        tables.votes.insert(vote_id, vote.clone());
        self.persist(&tables)?;

        debug!(session_id = %session_id, vote_id = %vote_id, "Vote recorded");
        Ok(vote)
    }

    /// Looks up a vote by id.
    #[must_use]
    pub fn vote(&self, id: VoteId) -> Option<Vote> {
        self.tables.read().votes.get(&id).cloned()
    }

    /// Number of votes recorded for a session (blank ballots included).
    #[must_use]
    pub fn vote_count(&self, session_id: SessionId) -> u64 {
        self.tables
            .read()
            .votes
            .values()
            .filter(|v| v.session_id == session_id)
            .count() as u64
    }

    /// Per-candidate vote counts for a session, ordered by candidate id.
    /// Blank ballots are not attributed to any candidate.
    ///
    /// # Errors
    /// - `SessionNotFound` for an unknown session
    pub fn tally(&self, session_id: SessionId) -> Result<Vec<(Candidate, u64)>, StoreError> {
        let tables = self.tables.read();
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound(session_id));
        }

        let mut counts: HashMap<CandidateId, u64> = HashMap::new();
        for vote in tables.votes.values().filter(|v| v.session_id == session_id) {
            if let Some(candidate_id) = vote.candidate_id {
                *counts.entry(candidate_id).or_insert(0) += 1;
            }
        }

        Ok(tables
            .candidates
            .values()
            .filter(|c| c.session_id == session_id)
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                (c.clone(), count)
            })
            .collect())
    }
}
