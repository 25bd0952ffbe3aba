//! Random token identifiers for rooms and client connections.

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use thiserror::Error;

/// Length of a room identifier (3 random bytes, hex encoded).
pub const ROOM_ID_LEN: usize = 6;
/// Length of a client identifier (6 random bytes, hex encoded).
pub const CLIENT_ID_LEN: usize = 12;
/// Upper bound on regenerations before giving up on a collision streak.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Identifier of a room in the directory.
pub type RoomId = String;
/// Identifier of a live client connection.
pub type ClientId = String;

/// Raised when every candidate produced by a [`TokenSource`] was already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not allocate a unique identifier after {attempts} attempts")]
pub struct IdExhausted {
    /// Number of candidates that were tried.
    pub attempts: usize,
}

/// Source of candidate identifiers.
pub trait TokenSource: Send + Sync {
    /// Produce a candidate token of exactly `len` characters.
    fn next_token(&self, len: usize) -> String;
}

/// Lowercase hexadecimal tokens drawn from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHexTokens;

impl TokenSource for RandomHexTokens {
    fn next_token(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char)
            .collect()
    }
}

/// Insert `value` under a freshly generated key, regenerating on collision.
///
/// The vacancy check and the insertion happen on the same map entry, so two
/// concurrent allocations can never end up with the same key.
pub fn insert_unique<V>(
    map: &DashMap<String, V>,
    tokens: &dyn TokenSource,
    len: usize,
    make: impl FnOnce(&str) -> V,
) -> Result<String, IdExhausted> {
    let mut make = Some(make);
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidate = tokens.next_token(len);
        if let Entry::Vacant(slot) = map.entry(candidate.clone()) {
            // `make` is only taken once, on the single vacant hit.
            if let Some(make) = make.take() {
                slot.insert(make(&candidate));
            }
            return Ok(candidate);
        }
    }
    Err(IdExhausted {
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}
