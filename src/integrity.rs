//! Coarse plausibility checks on a reconstructed buffer.
//!
//! Passing here means the buffer is long enough, not mostly nulls, and could be
//! digested. It says nothing about whether the file is semantically valid.

use sha2::{Digest, Sha256};

/// Buffers shorter than this never verify
pub const MIN_VERIFIABLE_LEN: usize = 10;

/// Length of a hex-encoded SHA-256 digest
const SHA256_HEX_LEN: usize = 64;

/// Hex SHA-256 of `data`, or `None` if digesting panicked.
pub fn content_digest(data: &[u8]) -> Option<String> {
    std::panic::catch_unwind(|| format!("{:x}", Sha256::digest(data))).ok()
}

/// Returns true when more than half of the bytes are zero
pub fn is_mostly_null(data: &[u8]) -> bool {
    let nulls = data.iter().filter(|&&b| b == 0).count();
    nulls * 2 > data.len()
}

/// Sanity-check a buffer. Never panics and never errors: any failure while
/// digesting counts as a failed verification.
pub fn verify_integrity(data: &[u8]) -> bool {
    if data.len() < MIN_VERIFIABLE_LEN {
        return false;
    }

    if is_mostly_null(data) {
        return false;
    }

    content_digest(data).is_some_and(|digest| digest.len() == SHA256_HEX_LEN)
}
