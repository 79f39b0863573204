use std::borrow::Cow;

use crate::error::{framed_len, reserve_buffer, Result};
use crate::types::FileKind;

/// JPEG start-of-image marker
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
/// JPEG end-of-image marker
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
/// Full 8-byte PNG signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// IEND chunk type followed by its CRC
pub const PNG_IEND: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];
pub const PDF_HEADER: &[u8] = b"%PDF-1.7\n";
pub const PDF_FOOTER: &[u8] = b"%%EOF\n";

/// Rewrap `data` in the outer framing of `kind`.
///
/// Only the envelope is touched. Internal offsets, chunk lengths and
/// cross-references are left exactly as they are.
pub fn reconstruct_file_structure(kind: FileKind, data: &[u8]) -> Result<Cow<'_, [u8]>> {
    match kind {
        FileKind::Jpg => reconstruct_jpeg(data).map(Cow::Owned),
        FileKind::Png => reconstruct_png(data).map(Cow::Owned),
        FileKind::Pdf => reconstruct_pdf(data).map(Cow::Owned),
        FileKind::Zip | FileKind::Json | FileKind::XmlOrHtml | FileKind::Unknown => {
            Ok(Cow::Borrowed(data))
        }
    }
}

/// `len + 4` bytes: SOI at 0, payload from 2, EOI in the final 2 bytes.
fn reconstruct_jpeg(data: &[u8]) -> Result<Vec<u8>> {
    let total = framed_len(data.len(), 4)?;
    let mut out = reserve_buffer(total)?;
    out.extend_from_slice(&JPEG_SOI);
    out.extend_from_slice(data);
    out.extend_from_slice(&JPEG_EOI);
    Ok(out)
}

/// `len + 16` bytes: PNG signature, payload, IEND in the final 8 bytes.
fn reconstruct_png(data: &[u8]) -> Result<Vec<u8>> {
    let total = framed_len(data.len(), PNG_SIGNATURE.len() + PNG_IEND.len())?;
    let mut out = reserve_buffer(total)?;
    out.extend_from_slice(&PNG_SIGNATURE);
    out.extend_from_slice(data);
    out.extend_from_slice(&PNG_IEND);
    Ok(out)
}

fn reconstruct_pdf(data: &[u8]) -> Result<Vec<u8>> {
    let total = framed_len(data.len(), PDF_HEADER.len() + PDF_FOOTER.len())?;
    let mut out = reserve_buffer(total)?;
    out.extend_from_slice(PDF_HEADER);
    out.extend_from_slice(data);
    out.extend_from_slice(PDF_FOOTER);
    Ok(out)
}
