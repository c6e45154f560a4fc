//! # API Gateway
//!
//! External interface of the election service: REST routes for record
//! management and permit/vote operations, plus WebSocket attach points for
//! booth and poll-worker observers.
//!
//! ## Surfaces
//!
//! - `rest` — `/api/...` routes (sessions, candidates, poll workers,
//!   permits, votes, results)
//! - `ws` — `/ws/sessions/{id}/booth` and `/ws/sessions/{id}/station`
//! - `service` — router assembly, bind and serve with graceful shutdown
//!
//! Rejections serialize as `{"detail": "<message>"}` with a 400 or 404
//! status; the observer channel answers malformed requests with
//! `{"type": "error", "detail": "<message>"}` frames instead of closing.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod rest;
pub mod schemas;
pub mod service;
pub mod ws;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError};
pub use service::{AppState, GatewayService};
