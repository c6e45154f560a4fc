//! # CIPA Vote Test Suite
//!
//! Cross-crate integration tests: the authorization flows, the concurrency
//! properties (exactly-one-success under contention), and the observer
//! broadcast behavior, all over the real store wired through the real
//! adapters.

pub mod integration;
