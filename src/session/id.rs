//! Session identifiers.
//!
//! An id is 16 random bytes followed by the big-endian nanosecond wall-clock
//! timestamp, hex encoded (48 characters). The random part keeps concurrent
//! sessions in one store directory apart; the timestamp makes ids sortable
//! by creation time within the same random prefix.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::scanner::hash_to_hex;

/// Length of a session id in characters.
pub const SESSION_ID_LEN: usize = 48;

/// Generate a fresh session id.
#[must_use]
pub fn session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    format_session_id(Uuid::new_v4().as_bytes(), nanos)
}

fn format_session_id(random: &[u8; 16], nanos: u64) -> String {
    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(random);
    bytes.extend_from_slice(&nanos.to_be_bytes());
    hash_to_hex(&bytes)
}
