//! # Election Store
//!
//! Durable record store for sessions, candidates, poll workers, permits and
//! votes.
//!
//! ## Guarantees
//!
//! - **Uniqueness constraints**: session `code`, permit `token`,
//!   `(session_id, registration)` per permit, and `permit_id` per vote are
//!   all backed by indices checked inside the store's write lock — never by
//!   a caller-side read-then-write.
//! - **Atomic consume**: flipping a permit's `used` flag and inserting the
//!   vote row happen as one unit under the write lock. Concurrent consume
//!   calls on one token yield exactly one success.
//! - **Snapshot durability**: the full table set can be persisted to a
//!   magic-prefixed, versioned snapshot file and reloaded on restart.
//!
//! The store is the single source of truth for permit `used` state; callers
//! must not cache it across calls.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod memory;
pub mod persistence;

pub use errors::StoreError;
pub use memory::ElectionStore;
