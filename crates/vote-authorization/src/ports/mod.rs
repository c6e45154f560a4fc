//! Ports layer for the authorization subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Outbound (Driven) ports: dependencies on the durable store

pub mod outbound;

pub use outbound::*;
