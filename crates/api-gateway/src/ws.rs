//! WebSocket observer endpoints.
//!
//! Both endpoints split the socket and drive all outbound frames through an
//! unbounded queue drained by a writer task, so registry broadcasts never
//! block on socket I/O. The queue sender doubles as the observer sink; once
//! the writer task is gone, the next delivery fails and the registry prunes
//! the observer.
//!
//! - `/ws/sessions/{id}/booth` — listen-only; receives `permit_issued`.
//! - `/ws/sessions/{id}/station` — receives `vote_registered` and accepts
//!   `{"action": "authorize", "registration": …}` requests, answered on the
//!   same socket with `authorized` or `error` frames.

use crate::service::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use shared_types::{wire_timestamp, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use vote_authorization::{ObserverSink, SinkError};

/// Observer sink writing into a connection's outbound queue.
pub(crate) struct ConnectionSink {
    outbound: mpsc::UnboundedSender<String>,
}

impl ConnectionSink {
    pub(crate) fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { outbound }
    }
}

#[async_trait::async_trait]
impl ObserverSink for ConnectionSink {
    async fn deliver(&self, payload: &str) -> Result<(), SinkError> {
        self.outbound
            .send(payload.to_string())
            .map_err(|_| SinkError::Closed)
    }
}

/// `GET /ws/sessions/{id}/booth`
pub async fn booth_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<u64>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| booth_connection(socket, state, SessionId(session_id)))
}

/// `GET /ws/sessions/{id}/station`
pub async fn station_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<u64>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| station_connection(socket, state, SessionId(session_id)))
}

async fn booth_connection(socket: WebSocket, state: AppState, session_id: SessionId) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let registry = Arc::clone(state.manager.registry());
    let observer = registry.add_booth(session_id, Arc::new(ConnectionSink::new(outbound_tx)));
    info!(session_id = %session_id, observer_id = %observer, "Booth observer attached");

    let (ws_sink, mut ws_stream) = socket.split();
    let writer = tokio::spawn(pump_outbound(ws_sink, outbound_rx));

    // Booth terminals only listen; inbound frames are drained and ignored.
    while let Some(Ok(frame)) = ws_stream.next().await {
        if matches!(frame, Message::Close(_)) {
            break;
        }
    }

    registry.remove_booth(session_id, observer);
    writer.abort();
    info!(session_id = %session_id, observer_id = %observer, "Booth observer detached");
}

async fn station_connection(socket: WebSocket, state: AppState, session_id: SessionId) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let registry = Arc::clone(state.manager.registry());
    let observer = registry.add_poll_worker(
        session_id,
        Arc::new(ConnectionSink::new(outbound_tx.clone())),
    );
    info!(session_id = %session_id, observer_id = %observer, "Poll-worker observer attached");

    let (ws_sink, mut ws_stream) = socket.split();
    let writer = tokio::spawn(pump_outbound(ws_sink, outbound_rx));

    while let Some(Ok(frame)) = ws_stream.next().await {
        match frame {
            Message::Text(text) => {
                let reply = handle_station_frame(&state, session_id, &text).await;
                if outbound_tx.send(reply).is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    registry.remove_poll_worker(session_id, observer);
    writer.abort();
    info!(session_id = %session_id, observer_id = %observer, "Poll-worker observer detached");
}

/// Drains the outbound queue into the socket until either side closes.
async fn pump_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    while let Some(frame) = outbound.recv().await {
        if sink.send(Message::Text(frame)).await.is_err() {
            break;
        }
    }
}

/// Inbound request on a station socket.
#[derive(Debug, Deserialize)]
struct StationRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    registration: Option<String>,
}

/// Answers one inbound station frame. Malformed requests get an `error`
/// frame rather than a closed connection.
pub(crate) async fn handle_station_frame(
    state: &AppState,
    session_id: SessionId,
    text: &str,
) -> String {
    let request: StationRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(_) => return error_frame("Malformed request"),
    };

    match request.action.as_deref() {
        Some("authorize") => {
            let registration = request.registration.unwrap_or_default();
            match state.manager.issue_permit(session_id, &registration).await {
                Ok(issued) => json!({
                    "type": "authorized",
                    "token": issued.token,
                    "issued_at": wire_timestamp(issued.issued_at),
                })
                .to_string(),
                Err(e) => error_frame(&e.to_string()),
            }
        }
        _ => error_frame("Unknown action"),
    }
}

fn error_frame(detail: &str) -> String {
    json!({ "type": "error", "detail": detail }).to_string()
}
