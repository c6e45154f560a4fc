//! REST route handlers.
//!
//! Thin handlers: CRUD goes straight to the election store; permit issuance
//! and vote registration go through the Authorization Manager so the
//! broadcast and concurrency contracts hold no matter which surface the
//! request came in on.

use crate::error::ApiError;
use crate::schemas::{
    CandidateCreate, CandidateRead, PermitCreate, PermitRead, PollWorkerCreate, PollWorkerRead,
    SessionCreate, SessionOverview, SessionRead, VoteRead, VoteRequest, VoteSummary,
};
use crate::service::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use shared_types::{SessionId, VotingSession};

/// The `/api` route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/:session_id/start", post(start_session))
        .route("/sessions/:session_id/close", post(close_session))
        .route(
            "/sessions/:session_id/candidates",
            post(create_candidate).get(list_candidates),
        )
        .route(
            "/sessions/:session_id/poll_workers",
            post(create_poll_worker).get(list_poll_workers),
        )
        .route("/sessions/:session_id/permits", post(issue_permit))
        .route("/sessions/:session_id/votes", post(register_vote))
        .route("/sessions/:session_id/results", get(session_results))
}

fn ensure_session(state: &AppState, id: SessionId) -> Result<VotingSession, ApiError> {
    state
        .store
        .session(id)
        .ok_or_else(|| ApiError::not_found("Session not found"))
}

async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<SessionCreate>,
) -> Result<(StatusCode, Json<SessionRead>), ApiError> {
    let session = state.store.create_session(&body.code, body.expected_votes)?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionOverview>> {
    let overviews = state
        .store
        .sessions()
        .into_iter()
        .map(|session| {
            let total = state.store.vote_count(session.id);
            SessionOverview::new(session, total)
        })
        .collect();
    Json(overviews)
}

async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<SessionRead>, ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let session = state.store.start_session(id)?;
    Ok(Json(session.into()))
}

async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<SessionRead>, ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let session = state.store.close_session(id)?;
    Ok(Json(session.into()))
}

async fn create_candidate(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(body): Json<CandidateCreate>,
) -> Result<(StatusCode, Json<CandidateRead>), ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let candidate =
        state
            .store
            .add_candidate(id, &body.name, &body.registration, &body.commission_number)?;
    Ok((StatusCode::CREATED, Json(candidate.into())))
}

async fn list_candidates(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<Vec<CandidateRead>>, ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let candidates = state.store.candidates(id)?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

async fn create_poll_worker(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(body): Json<PollWorkerCreate>,
) -> Result<(StatusCode, Json<PollWorkerRead>), ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let worker = state
        .store
        .add_poll_worker(id, &body.name, &body.registration)?;
    Ok((StatusCode::CREATED, Json(worker.into())))
}

async fn list_poll_workers(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<Vec<PollWorkerRead>>, ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let workers = state.store.poll_workers(id)?;
    Ok(Json(workers.into_iter().map(Into::into).collect()))
}

async fn issue_permit(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(body): Json<PermitCreate>,
) -> Result<(StatusCode, Json<PermitRead>), ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let issued = state.manager.issue_permit(id, &body.registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(PermitRead {
            token: issued.token,
            issued_at: issued.issued_at,
        }),
    ))
}

async fn register_vote(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(body): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteRead>), ApiError> {
    let id = SessionId(session_id);
    ensure_session(&state, id)?;
    let vote = state
        .manager
        .cast_vote(id, &body.permit_token, body.candidate_id, body.null_vote)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(VoteRead {
            id: vote.id,
            candidate_id: vote.candidate_id,
            created_at: vote.created_at,
        }),
    ))
}

async fn session_results(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<Vec<VoteSummary>>, ApiError> {
    let id = SessionId(session_id);
    let tally = state.store.tally(id)?;
    Ok(Json(
        tally
            .into_iter()
            .map(|(candidate, total_votes)| VoteSummary {
                candidate_id: candidate.id,
                candidate_name: candidate.name,
                total_votes,
            })
            .collect(),
    ))
}
