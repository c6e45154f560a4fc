//! Integration tests across the workspace crates.

pub mod authorization_flow;
pub mod broadcast;
pub mod concurrency;
pub mod runtime_wiring;
