//! Corrupted-file repair pipeline
//!
//! Takes a byte buffer believed to be a damaged file and:
//! - classifies it from its leading magic number
//! - rewrites the canonical header for jpg/png/pdf
//! - drops 1 KiB windows holding long 0x00 or 0xFF runs
//! - rewraps the payload in the format's outer framing
//! - sanity-checks the result and persists it with a JSON audit log
//!
//! Only outer framing is repaired. Nothing here parses or fixes format
//! internals.

pub mod cli;
pub mod disk;
pub mod error;
pub mod integrity;
pub mod recovery;
pub mod signature;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use types::{FileKind, RecoveryLog, RecoveryRequest, RecoveryResult, RecoveryStage};
pub use types::StorageConfig;
pub use disk::InputFile;
pub use recovery::{inspect, RecoveryService, StageReport};
pub use signature::classify;
pub use integrity::{content_digest, verify_integrity};
pub use storage::{load_recovery_log, RecoveryStore};
pub use error::{RecoveryError, Result};
