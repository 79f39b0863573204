use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use rust_file_repair::cli::{Args, Command};
use rust_file_repair::{
    content_digest, inspect, load_recovery_log, verify_integrity, InputFile, RecoveryResult,
    RecoveryService,
};

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rust_file_repair=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every requested operation succeeded
fn run() -> Result<bool> {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Invalid arguments: {}", e);
        std::process::exit(2);
    }

    match &args.command {
        Command::Recover { files } => recover_files(&args, files),
        Command::Verify { file } => verify_file(&args, file),
        Command::Inspect { file } => inspect_file(&args, file),
        Command::Log { file } => {
            let log = load_recovery_log(file)
                .with_context(|| format!("Failed to read recovery log {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&log)?);
            Ok(true)
        }
    }
}

fn recover_files(args: &Args, files: &[PathBuf]) -> Result<bool> {
    let config = args.storage_config();
    let service = RecoveryService::new(config.clone()).with_context(|| {
        format!(
            "Failed to prepare storage at {} and {}",
            config.recovery_dir.display(),
            config.log_dir.display()
        )
    })?;

    tracing::info!(files = files.len(), recovery_dir = %config.recovery_dir.display(), "starting recovery");

    let outcomes: Vec<(&PathBuf, rust_file_repair::Result<RecoveryResult>)> = files
        .par_iter()
        .map(|path| {
            let outcome = InputFile::open(path).map(|input| service.recover(input.into_request()));
            (path, outcome)
        })
        .collect();

    let all_ok = outcomes
        .iter()
        .all(|(_, outcome)| matches!(outcome, Ok(result) if result.success));

    if args.json {
        let report: Vec<_> = outcomes
            .iter()
            .map(|(path, outcome)| match outcome {
                Ok(result) => json!({ "input": path, "result": result }),
                Err(e) => json!({ "input": path, "error": e.to_string() }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(all_ok);
    }

    for (path, outcome) in &outcomes {
        match outcome {
            Ok(result) if result.success => {
                let target = result
                    .recovered_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("OK    {} -> {} ({})", path.display(), target, result.kind);
                if let Some(checksum) = &result.checksum {
                    println!("      sha256 {}", checksum);
                }
            }
            Ok(result) => {
                println!(
                    "FAIL  {}: {} ({} steps)",
                    path.display(),
                    result.error.as_deref().unwrap_or("unknown error"),
                    result.log.steps().len()
                );
            }
            Err(e) => println!("FAIL  {}: {}", path.display(), e),
        }
    }

    Ok(all_ok)
}

fn verify_file(args: &Args, file: &Path) -> Result<bool> {
    let input = InputFile::open(file)?;
    let valid = verify_integrity(input.bytes());
    let digest = content_digest(input.bytes());

    if args.json {
        let report = json!({ "input": file, "valid": valid, "length": input.len(), "sha256": digest });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}: {}", file.display(), if valid { "valid" } else { "invalid" });
        println!("  length {} bytes", input.len());
        if let Some(digest) = digest {
            println!("  sha256 {}", digest);
        }
    }

    Ok(valid)
}

fn inspect_file(args: &Args, file: &Path) -> Result<bool> {
    let input = InputFile::open(file)?;
    let report = inspect(input.bytes())
        .with_context(|| format!("Failed to inspect {}", file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", file.display());
        println!("  kind           {}", report.kind);
        println!("  input          {} bytes", report.input_len);
        println!("  header repair  {} bytes", report.repaired_len);
        println!("  scrubbed       {} bytes", report.scrubbed_len);
        println!("  reconstructed  {} bytes", report.reconstructed_len);
        println!("  integrity      {}", if report.verified { "pass" } else { "fail" });
    }

    Ok(report.verified)
}
