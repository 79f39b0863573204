use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{RecoveryError, Result};
use crate::types::{RecoveryLog, StorageConfig};

/// Name used when the original name has no usable final component
const FALLBACK_NAME: &str = "unnamed";

/// Durable home of recovered files and recovery logs.
///
/// Runs share nothing but these two directories. Names carry a millisecond
/// timestamp, so two runs for the same name within one millisecond write the
/// same path and the later one wins.
#[derive(Debug, Clone)]
pub struct RecoveryStore {
    config: StorageConfig,
}

impl RecoveryStore {
    /// Create both directories if absent. Safe to race with other processes
    /// doing the same.
    pub fn open(config: StorageConfig) -> Result<Self> {
        for dir in [&config.recovery_dir, &config.log_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Persist recovered bytes as `recovered_<epoch-millis>_<name>`.
    pub fn write_recovered(&self, original_name: &str, data: &[u8]) -> Result<PathBuf> {
        let file_name = recovered_file_name(original_name, epoch_millis());
        let path = self.config.recovery_dir.join(file_name);
        write_atomic(&path, data)?;
        Ok(path)
    }

    /// Persist `log` as pretty JSON under `recovery_<epoch-millis>.json`.
    pub fn write_log(&self, log: &RecoveryLog) -> Result<PathBuf> {
        let path = self
            .config
            .log_dir
            .join(format!("recovery_{}.json", epoch_millis()));
        write_json(&path, log)?;
        Ok(path)
    }

    /// Write the log, swallowing any failure. The audit trail is a diagnostic
    /// aid; losing it never changes the outcome of a run.
    pub fn persist_log_best_effort(&self, log: &RecoveryLog) -> Option<PathBuf> {
        match self.write_log(log) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "recovery log written");
                Some(path)
            }
            Err(err) => {
                tracing::warn!(error = %err, "recovery log not written");
                None
            }
        }
    }
}

/// `recovered_<millis>_<name>`, keeping only the final path component of
/// `original_name` so the result always lands inside the recovery directory.
pub fn recovered_file_name(original_name: &str, millis: i64) -> String {
    let name = Path::new(original_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    format!("recovered_{}_{}", millis, name)
}

/// Read a persisted recovery log back
pub fn load_recovery_log(path: &Path) -> Result<RecoveryLog> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecoveryError::FileNotFound(path.display().to_string())
        } else {
            RecoveryError::Io(e)
        }
    })?;
    Ok(serde_json::from_slice(&data)?)
}

fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let serialized = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &serialized)
}

/// Write through a private temp file in the target's directory and rename it
/// into place, so readers never observe a partially written file. Concurrent
/// writers of one path each get their own temp file; the last rename wins.
/// The temp file is removed on every error path when it drops.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| RecoveryError::Io(e.error))?;
    Ok(())
}
