use std::borrow::Cow;

use crate::error::{reserve_buffer, Result};

/// Size of the windows the scrubber judges independently
pub const CHUNK_SIZE: usize = 1024;

/// A run of this many identical 0x00 or 0xFF bytes marks a window as corrupt
pub const CORRUPT_RUN_LEN: usize = 16;

/// Drop every `CHUNK_SIZE` window that looks corrupted and concatenate the rest.
///
/// This is a blunt heuristic: legitimate padding or solid-colour image regions
/// are indistinguishable from damage and get removed too. The output is never
/// longer than the input; when no window is dropped the input is returned
/// borrowed.
pub fn remove_corrupted_sections(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    if data.chunks(CHUNK_SIZE).all(is_valid_chunk) {
        return Ok(Cow::Borrowed(data));
    }

    let kept: usize = data
        .chunks(CHUNK_SIZE)
        .filter(|chunk| is_valid_chunk(chunk))
        .map(<[u8]>::len)
        .sum();

    let mut cleaned = reserve_buffer(kept)?;
    for chunk in data.chunks(CHUNK_SIZE).filter(|chunk| is_valid_chunk(chunk)) {
        cleaned.extend_from_slice(chunk);
    }

    Ok(Cow::Owned(cleaned))
}

/// A chunk is valid unless it contains `CORRUPT_RUN_LEN` consecutive zero
/// bytes or `CORRUPT_RUN_LEN` consecutive 0xFF bytes.
pub fn is_valid_chunk(chunk: &[u8]) -> bool {
    !has_run(chunk, 0x00, CORRUPT_RUN_LEN) && !has_run(chunk, 0xFF, CORRUPT_RUN_LEN)
}

fn has_run(data: &[u8], byte: u8, run_len: usize) -> bool {
    let mut run = 0usize;
    for &b in data {
        if b == byte {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
