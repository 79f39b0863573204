//! The recovery pipeline.
//!
//! A run moves strictly forward through
//! `Started -> SignatureAnalyzed -> HeaderRepaired -> Scrubbed -> Reconstructed
//! -> Verified -> Saved`, appending one step to its log per transition. Any
//! stage error, or a failed integrity check, diverts the run to `Failed`.
//! Either way the log is persisted best-effort and the caller gets a
//! `RecoveryResult`; errors never escape `recover`.

pub mod cleaner;
pub mod header;
pub mod reconstructor;

pub use cleaner::{is_valid_chunk, remove_corrupted_sections};
pub use header::repair_header;
pub use reconstructor::reconstruct_file_structure;

use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use tokio::task;

use crate::error::{RecoveryError, Result};
use crate::integrity::{content_digest, verify_integrity};
use crate::signature::classify;
use crate::storage::RecoveryStore;
use crate::types::{
    FileKind, RecoveryLog, RecoveryRequest, RecoveryResult, RecoveryStage, StorageConfig,
};

/// Runs recovery requests against one storage location.
///
/// Cheap to clone; clones share nothing in memory and may run concurrently.
#[derive(Debug, Clone)]
pub struct RecoveryService {
    store: RecoveryStore,
}

impl RecoveryService {
    /// Open the storage directories described by `config`
    pub fn new(config: StorageConfig) -> Result<Self> {
        Ok(Self::with_store(RecoveryStore::open(config)?))
    }

    pub fn with_store(store: RecoveryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecoveryStore {
        &self.store
    }

    /// Run the full pipeline on one damaged buffer.
    pub fn recover(&self, request: RecoveryRequest) -> RecoveryResult {
        let span = tracing::info_span!(
            "recover",
            file = %request.original_name,
            len = request.source_bytes.len()
        );
        let _guard = span.enter();

        let outcome = RecoveryRun::start(request)
            .analyze_signature()
            .and_then(RecoveryRun::repair_header)
            .and_then(RecoveryRun::scrub)
            .and_then(RecoveryRun::reconstruct)
            .and_then(RecoveryRun::verify)
            .and_then(|run| run.save(&self.store));

        match outcome {
            Ok(done) => {
                self.store.persist_log_best_effort(&done.log);
                tracing::info!(kind = %done.kind, path = %done.path.display(), "file recovered");
                RecoveryResult::succeeded(done.kind, done.path, done.checksum, done.log)
            }
            Err(Interrupted { error, kind, stage, mut log }) => {
                let message = error.to_string();
                tracing::warn!(%kind, after = %stage, error = %message, "recovery failed");
                log.record_error(message.clone());
                self.store.persist_log_best_effort(&log);
                RecoveryResult::failed(kind, message, log)
            }
        }
    }

    /// Convenience over `recover` for borrowed input
    pub fn recover_bytes(&self, source_bytes: &[u8], original_name: &str) -> RecoveryResult {
        self.recover(RecoveryRequest::new(source_bytes, original_name))
    }

    /// Run `recover` on the blocking pool so async callers are not stalled by
    /// file I/O or digesting. A panicked run still yields a failed result.
    pub async fn recover_async(&self, request: RecoveryRequest) -> RecoveryResult {
        let service = self.clone();
        let original_name = request.original_name.clone();

        match task::spawn_blocking(move || service.recover(request)).await {
            Ok(result) => result,
            Err(err) => {
                let message = RecoveryError::Task(err.to_string()).to_string();
                tracing::warn!(error = %message, "recovery task aborted");
                let mut log = RecoveryLog::new(original_name);
                log.record_error(message.clone());
                self.store.persist_log_best_effort(&log);
                RecoveryResult::failed(FileKind::Unknown, message, log)
            }
        }
    }

    pub fn verify_integrity(&self, data: &[u8]) -> bool {
        verify_integrity(data)
    }
}

/// Buffer sizes after each in-memory stage, without persisting anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub kind: FileKind,
    pub input_len: usize,
    pub repaired_len: usize,
    pub scrubbed_len: usize,
    pub reconstructed_len: usize,
    pub verified: bool,
}

/// Run every stage up to verification in memory and report what happened.
pub fn inspect(data: &[u8]) -> Result<StageReport> {
    let kind = classify(data);
    let repaired = repair_header(kind, data)?;
    let scrubbed = remove_corrupted_sections(&repaired)?;
    let reconstructed = reconstruct_file_structure(kind, &scrubbed)?;

    Ok(StageReport {
        kind,
        input_len: data.len(),
        repaired_len: repaired.len(),
        scrubbed_len: scrubbed.len(),
        reconstructed_len: reconstructed.len(),
        verified: verify_integrity(&reconstructed),
    })
}

/// One run in flight: the current buffer and the log so far
struct RecoveryRun {
    stage: RecoveryStage,
    kind: FileKind,
    buffer: Vec<u8>,
    log: RecoveryLog,
}

/// A run diverted to `Failed`, with everything needed to report it
struct Interrupted {
    error: RecoveryError,
    kind: FileKind,
    stage: RecoveryStage,
    log: RecoveryLog,
}

/// A run that reached `Saved`
struct Completed {
    kind: FileKind,
    path: PathBuf,
    checksum: Option<String>,
    log: RecoveryLog,
}

type Step = std::result::Result<RecoveryRun, Interrupted>;

impl RecoveryRun {
    fn start(request: RecoveryRequest) -> Self {
        Self {
            stage: RecoveryStage::Started,
            kind: FileKind::Unknown,
            log: RecoveryLog::new(request.original_name),
            buffer: request.source_bytes,
        }
    }

    fn advance(mut self, stage: RecoveryStage, replacement: Option<Vec<u8>>) -> Self {
        if let Some(buffer) = replacement {
            self.buffer = buffer;
        }
        self.stage = stage;
        self.log.record_stage(stage);
        tracing::debug!(%stage, len = self.buffer.len(), "stage complete");
        self
    }

    fn interrupt(self, error: RecoveryError) -> Interrupted {
        Interrupted {
            error,
            kind: self.kind,
            stage: self.stage,
            log: self.log,
        }
    }

    /// Apply a buffer transform; `None` from the transform keeps the buffer.
    fn transform<F>(self, stage: RecoveryStage, f: F) -> Step
    where
        F: FnOnce(FileKind, &[u8]) -> Result<Option<Vec<u8>>>,
    {
        match f(self.kind, &self.buffer) {
            Ok(replacement) => Ok(self.advance(stage, replacement)),
            Err(err) => Err(self.interrupt(err)),
        }
    }

    fn analyze_signature(mut self) -> Step {
        self.kind = classify(&self.buffer);
        Ok(self.advance(RecoveryStage::SignatureAnalyzed, None))
    }

    fn repair_header(self) -> Step {
        self.transform(RecoveryStage::HeaderRepaired, |kind, data| {
            repair_header(kind, data).map(into_replacement)
        })
    }

    fn scrub(self) -> Step {
        self.transform(RecoveryStage::Scrubbed, |_, data| {
            remove_corrupted_sections(data).map(into_replacement)
        })
    }

    fn reconstruct(self) -> Step {
        self.transform(RecoveryStage::Reconstructed, |kind, data| {
            reconstruct_file_structure(kind, data).map(into_replacement)
        })
    }

    /// The verified step is recorded even when the check fails.
    fn verify(self) -> Step {
        let valid = verify_integrity(&self.buffer);
        let run = self.advance(RecoveryStage::Verified, None);
        if valid {
            Ok(run)
        } else {
            Err(run.interrupt(RecoveryError::IntegrityCheckFailed))
        }
    }

    fn save(self, store: &RecoveryStore) -> std::result::Result<Completed, Interrupted> {
        let path = match store.write_recovered(self.log.original_name(), &self.buffer) {
            Ok(path) => path,
            Err(err) => return Err(self.interrupt(err)),
        };

        let checksum = content_digest(&self.buffer);
        let mut run = self.advance(RecoveryStage::Saved, None);
        run.log.mark_saved(&path);

        Ok(Completed {
            kind: run.kind,
            path,
            checksum,
            log: run.log,
        })
    }
}

fn into_replacement(buffer: Cow<'_, [u8]>) -> Option<Vec<u8>> {
    match buffer {
        Cow::Owned(buffer) => Some(buffer),
        Cow::Borrowed(_) => None,
    }
}
