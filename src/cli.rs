use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::StorageConfig;

/// Corrupted-file repair: magic-number classification, framing repair,
/// corruption scrubbing and integrity checks
#[derive(Parser, Debug, Clone)]
#[command(name = "rust-file-repair")]
#[command(version)]
#[command(about = "Repair the outer framing of damaged files", long_about = None)]
pub struct Args {
    /// Base storage directory (holds recovered/ and logs/)
    #[arg(long = "storage", global = true, default_value = "storage")]
    pub storage: PathBuf,

    /// Override the directory recovered files are written to
    #[arg(long = "recovery-dir", global = true)]
    pub recovery_dir: Option<PathBuf>,

    /// Override the directory recovery logs are written to
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recover one or more damaged files
    Recover {
        /// Damaged input files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Check whether a file passes the integrity sanity checks
    Verify {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run the in-memory stages and report sizes without writing anything
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Pretty-print a persisted recovery log
    Log {
        #[arg(value_name = "LOG")]
        file: PathBuf,
    },
}

impl Args {
    /// Validate the arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.as_os_str().is_empty() {
            return Err("Storage path cannot be empty".to_string());
        }

        for (flag, dir) in [("recovery-dir", &self.recovery_dir), ("log-dir", &self.log_dir)] {
            if dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
                return Err(format!("{} cannot be empty", flag));
            }
        }

        if let Command::Recover { files } = &self.command {
            if files.iter().any(|f| f.as_os_str().is_empty()) {
                return Err("Input path cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Storage layout after applying directory overrides
    pub fn storage_config(&self) -> StorageConfig {
        let mut config = StorageConfig::under(&self.storage);
        if let Some(dir) = &self.recovery_dir {
            config.recovery_dir = dir.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        config
    }
}
