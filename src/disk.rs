use crate::error::{RecoveryError, Result};
use crate::types::RecoveryRequest;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only, memory-mapped view of a damaged file on disk
pub struct InputFile {
    // Zero-length files cannot be mapped on every platform
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl InputFile {
    /// Open and map `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RecoveryError::FileNotFound(path_ref.display().to_string())
            } else {
                RecoveryError::Io(e)
            }
        })?;

        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(RecoveryError::InvalidArgument(format!(
                "{} is not a regular file",
                path_ref.display()
            )));
        }

        let mmap = if metadata.len() == 0 {
            None
        } else {
            // Safety: the mapping is read-only and lives no longer than `self`;
            // the file is only read through it.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            mmap,
            path: path_ref.to_path_buf(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the original name of a recovery request
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Build a recovery request named after this file.
    ///
    /// `RecoveryRequest` owns its bytes, so this copies the mapping once and
    /// releases it. `verify` and `inspect` read `bytes()` directly and stay
    /// zero-copy.
    pub fn into_request(self) -> RecoveryRequest {
        RecoveryRequest::new(self.bytes().to_vec(), self.name())
    }
}
