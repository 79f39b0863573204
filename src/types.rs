use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File format recognised from a leading magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Jpg,
    Png,
    Pdf,
    Zip,
    Json,
    #[serde(rename = "xml/html")]
    XmlOrHtml,
    Unknown,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Jpg => "jpg",
            FileKind::Png => "png",
            FileKind::Pdf => "pdf",
            FileKind::Zip => "zip",
            FileKind::Json => "json",
            FileKind::XmlOrHtml => "xml/html",
            FileKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A damaged buffer handed over for recovery, with the name it arrived under
#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    pub source_bytes: Vec<u8>,
    pub original_name: String,
}

impl RecoveryRequest {
    pub fn new(source_bytes: impl Into<Vec<u8>>, original_name: impl Into<String>) -> Self {
        Self {
            source_bytes: source_bytes.into(),
            original_name: original_name.into(),
        }
    }
}

/// Pipeline states. `Saved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStage {
    Started,
    SignatureAnalyzed,
    HeaderRepaired,
    Scrubbed,
    Reconstructed,
    Verified,
    Saved,
    Failed,
}

impl RecoveryStage {
    /// Audit entry appended when the pipeline enters this stage.
    pub fn step_description(&self) -> Option<&'static str> {
        match self {
            RecoveryStage::SignatureAnalyzed => Some("File signature analyzed"),
            RecoveryStage::HeaderRepaired => Some("Header repair attempted"),
            RecoveryStage::Scrubbed => Some("Corrupted sections removed"),
            RecoveryStage::Reconstructed => Some("File structure reconstructed"),
            RecoveryStage::Verified => Some("File integrity verified"),
            RecoveryStage::Saved => Some("File saved successfully"),
            RecoveryStage::Started | RecoveryStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecoveryStage::Saved | RecoveryStage::Failed)
    }
}

impl std::fmt::Display for RecoveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecoveryStage::Started => "started",
            RecoveryStage::SignatureAnalyzed => "signature_analyzed",
            RecoveryStage::HeaderRepaired => "header_repaired",
            RecoveryStage::Scrubbed => "scrubbed",
            RecoveryStage::Reconstructed => "reconstructed",
            RecoveryStage::Verified => "verified",
            RecoveryStage::Saved => "saved",
            RecoveryStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Audit trail of one recovery run.
///
/// Steps and errors only grow while the run is in flight; once the run
/// returns, callers only get shared access. `success` implies a non-empty
/// `recovered_path` and no errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryLog {
    timestamp: DateTime<Utc>,
    original_name: String,
    steps: Vec<String>,
    success: bool,
    recovered_path: String,
    errors: Vec<String>,
}

impl RecoveryLog {
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            original_name: original_name.into(),
            steps: Vec::new(),
            success: false,
            recovered_path: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn recovered_path(&self) -> &str {
        &self.recovered_path
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether the success/path/errors fields agree with each other
    pub fn is_consistent(&self) -> bool {
        if self.success {
            !self.recovered_path.is_empty() && self.errors.is_empty()
        } else {
            true
        }
    }

    pub(crate) fn record_stage(&mut self, stage: RecoveryStage) {
        if let Some(step) = stage.step_description() {
            self.steps.push(step.to_string());
        }
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.success = false;
        self.errors.push(message.into());
    }

    pub(crate) fn mark_saved(&mut self, path: &Path) {
        debug_assert!(self.errors.is_empty(), "saved run must not carry errors");
        self.success = true;
        self.recovered_path = path.display().to_string();
    }
}

/// Terminal output of `recover()`; produced exactly once per run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub kind: FileKind,
    pub stage: RecoveryStage,
    /// Hex SHA-256 of the persisted bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub log: RecoveryLog,
}

impl RecoveryResult {
    pub(crate) fn succeeded(
        kind: FileKind,
        recovered_path: PathBuf,
        checksum: Option<String>,
        log: RecoveryLog,
    ) -> Self {
        Self {
            success: true,
            recovered_path: Some(recovered_path),
            error: None,
            kind,
            stage: RecoveryStage::Saved,
            checksum,
            log,
        }
    }

    pub(crate) fn failed(kind: FileKind, error: String, log: RecoveryLog) -> Self {
        Self {
            success: false,
            recovered_path: None,
            error: Some(error),
            kind,
            stage: RecoveryStage::Failed,
            checksum: None,
            log,
        }
    }
}

/// Where recovered files and recovery logs are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub recovery_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::under("storage")
    }
}

impl StorageConfig {
    /// `<base>/recovered` and `<base>/logs`
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            recovery_dir: base.join("recovered"),
            log_dir: base.join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_serialized_names() {
        assert_eq!(serde_json::to_string(&FileKind::XmlOrHtml).unwrap(), "\"xml/html\"");
        assert_eq!(serde_json::to_string(&FileKind::Jpg).unwrap(), "\"jpg\"");
        assert_eq!(FileKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(RecoveryStage::Started.step_description(), None);
        assert_eq!(RecoveryStage::Failed.step_description(), None);
        assert_eq!(
            RecoveryStage::Verified.step_description(),
            Some("File integrity verified")
        );
        assert!(RecoveryStage::Saved.is_terminal());
        assert!(!RecoveryStage::Verified.is_terminal());
    }

    #[test]
    fn test_log_json_field_names() {
        let mut log = RecoveryLog::new("photo.jpg");
        log.record_stage(RecoveryStage::SignatureAnalyzed);
        let value = serde_json::to_value(&log).unwrap();

        for field in ["timestamp", "originalName", "steps", "success", "recoveredPath", "errors"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["recoveredPath"], "");
        assert_eq!(value["steps"][0], "File signature analyzed");
    }

    #[test]
    fn test_log_consistency() {
        let mut log = RecoveryLog::new("a.png");
        assert!(log.is_consistent());

        log.mark_saved(Path::new("/tmp/recovered_1_a.png"));
        assert!(log.success());
        assert!(log.is_consistent());

        let mut failed = RecoveryLog::new("b.png");
        failed.record_error("File integrity check failed");
        assert!(!failed.success());
        assert_eq!(failed.errors().len(), 1);
        assert!(failed.is_consistent());
    }

    #[test]
    fn test_storage_config_layout() {
        let config = StorageConfig::under("/srv/data");
        assert_eq!(config.recovery_dir, PathBuf::from("/srv/data/recovered"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/data/logs"));
        assert_eq!(StorageConfig::default(), StorageConfig::under("storage"));
    }
}
