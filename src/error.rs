use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for the repair pipeline
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Framing overflow: buffer of {len} bytes cannot grow by {extra} bytes")]
    SizeOverflow { len: usize, extra: usize },

    #[error("File integrity check failed")]
    IntegrityCheckFailed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Recovery task failed: {0}")]
    Task(String),
}

/// Result type alias for repair operations
pub type Result<T> = std::result::Result<T, RecoveryError>;

/// Allocate an empty buffer with room for exactly `capacity` bytes, reporting
/// allocation failure instead of aborting.
pub(crate) fn reserve_buffer(capacity: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(capacity)?;
    Ok(buffer)
}

/// `len + extra`, or `SizeOverflow` when the framed buffer cannot be addressed.
pub(crate) fn framed_len(len: usize, extra: usize) -> Result<usize> {
    len.checked_add(extra)
        .ok_or(RecoveryError::SizeOverflow { len, extra })
}
