//! # Permit Token Generator
//!
//! Produces the opaque, unguessable tokens handed to voters.
//!
//! Tokens are 16 bytes from the OS entropy source, encoded with the
//! URL-safe base64 alphabet without padding. They are never derived from
//! counters, timestamps or any other predictable state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per token. 128 bits: collision is not a practical concern.
pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Generator for permit tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh URL-safe token.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
