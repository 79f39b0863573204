use std::fs;
use std::path::PathBuf;
use std::sync::Barrier;
use std::thread;

use rayon::prelude::*;
use rust_file_repair::recovery::reconstructor::{JPEG_EOI, JPEG_SOI, PNG_IEND, PNG_SIGNATURE};
use rust_file_repair::{
    classify, content_digest, load_recovery_log, FileKind, RecoveryRequest, RecoveryService,
    RecoveryStage, StorageConfig,
};
use tempfile::TempDir;

fn service() -> (TempDir, RecoveryService) {
    let dir = TempDir::new().unwrap();
    let service = RecoveryService::new(StorageConfig::under(dir.path())).unwrap();
    (dir, service)
}

/// Deterministic payload with no long 0x00/0xFF runs
fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 254) as u8 + 1).collect()
}

fn log_paths(service: &RecoveryService) -> Vec<PathBuf> {
    fs::read_dir(&service.store().config().log_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

#[test]
fn png_signature_with_clean_payload_is_recovered() {
    let (_dir, service) = service();
    let mut input = PNG_SIGNATURE.to_vec();
    input.extend(payload(100));

    let result = service.recover(RecoveryRequest::new(input, "scan.png"));

    assert!(result.success);
    assert_eq!(result.log.steps().len(), 6);
    assert!(!result.log.recovered_path().is_empty());
    assert!(result.log.errors().is_empty());

    let saved = fs::read(result.recovered_path.as_ref().unwrap()).unwrap();
    assert!(saved.starts_with(&PNG_SIGNATURE));
    assert!(saved.ends_with(&PNG_IEND));
}

#[test]
fn five_zero_bytes_fail_integrity() {
    let (_dir, service) = service();

    let result = service.recover_bytes(&[0x00; 5], "five.bin");

    assert_eq!(result.kind, FileKind::Unknown);
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("File integrity check failed"));
    assert_eq!(result.log.errors(), ["File integrity check failed".to_string()]);
}

#[test]
fn all_ff_input_is_scrubbed_to_nothing() {
    let (_dir, service) = service();

    let report = rust_file_repair::inspect(&[0xFF; 2000]).unwrap();
    assert_eq!(report.scrubbed_len, 0);

    let result = service.recover_bytes(&[0xFF; 2000], "blank.raw");
    assert!(!result.success);
    assert_eq!(result.stage, RecoveryStage::Failed);
    assert!(fs::read_dir(&service.store().config().recovery_dir)
        .unwrap()
        .next()
        .is_none());
}

#[test]
fn jpeg_with_damaged_window_keeps_framing() {
    let (_dir, service) = service();
    let mut input = vec![0xFF, 0xD8, 0xFF, 0xE0];
    input.extend(payload(3000));
    // corrupt the second 1 KiB window
    input[1500..1532].fill(0x00);

    let result = service.recover_bytes(&input, "holiday.jpg");

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.kind, FileKind::Jpg);
    let saved = fs::read(result.recovered_path.unwrap()).unwrap();
    assert_eq!(saved.len(), input.len() - 1024 + 4);
    assert!(saved.starts_with(&JPEG_SOI));
    assert!(saved.ends_with(&JPEG_EOI));
}

#[test]
fn persisted_artifacts_match_the_result() {
    let (_dir, service) = service();
    let mut input = b"%PDF-1.6\n".to_vec();
    input.extend(payload(500));

    let result = service.recover_bytes(&input, "report.pdf");
    assert!(result.success);

    let saved = fs::read(result.recovered_path.as_ref().unwrap()).unwrap();
    assert_eq!(content_digest(&saved), result.checksum);
    assert_eq!(classify(&saved), FileKind::Pdf);

    let logs = log_paths(&service);
    assert_eq!(logs.len(), 1);
    let log = load_recovery_log(&logs[0]).unwrap();
    assert_eq!(log, result.log);
    assert!(log.success());
    assert_eq!(log.original_name(), "report.pdf");
}

#[test]
fn concurrent_runs_write_distinct_files() {
    let (_dir, service) = service();
    let names: Vec<String> = (0..8).map(|i| format!("part{i}.bin")).collect();

    let results: Vec<_> = names
        .par_iter()
        .map(|name| service.recover_bytes(&payload(256), name))
        .collect();

    assert!(results.iter().all(|r| r.success));
    let recovered = fs::read_dir(&service.store().config().recovery_dir)
        .unwrap()
        .count();
    assert_eq!(recovered, names.len());
}

#[test]
fn same_name_runs_in_parallel_all_succeed() {
    let (_dir, service) = service();
    let inputs: Vec<Vec<u8>> = (0..4)
        .map(|i| {
            let mut data = payload(200 * 1024);
            data[0] = i + 1;
            data
        })
        .collect();

    for _ in 0..20 {
        let barrier = Barrier::new(inputs.len());
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|data| {
                    let (barrier, service) = (&barrier, &service);
                    s.spawn(move || {
                        barrier.wait();
                        service.recover_bytes(data, "same.bin")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let checksums: Vec<_> = results.iter().map(|r| r.checksum.clone()).collect();
        for result in &results {
            assert!(result.success, "{:?}", result.error);
            // same-millisecond runs may overwrite each other, but never tear the file
            let saved = fs::read(result.recovered_path.as_ref().unwrap()).unwrap();
            assert!(checksums.contains(&content_digest(&saved)));
        }
    }

    let stray = fs::read_dir(&service.store().config().recovery_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with("recovered_"))
        .count();
    assert_eq!(stray, 0);
}
