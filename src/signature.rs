//! Magic-number classification and canonical header templates.

use crate::types::FileKind;

/// Number of leading bytes inspected when classifying a buffer
pub const SIGNATURE_LEN: usize = 4;

/// Magic number with the kind it identifies
pub struct Signature {
    pub kind: FileKind,
    /// Lowercase hex of the leading bytes
    pub magic: &'static str,
}

/// Checked in order; the first prefix match wins.
///
/// The one-byte `json` and `xml/html` entries are prefixes too, so any input
/// of 4 or more bytes starting with `{` or `<` reports that kind rather than
/// `unknown`. Neither kind has a header template or framing, so only the
/// reported `kind` is affected, never the recovered bytes.
pub static SIGNATURES: [Signature; 6] = [
    Signature { kind: FileKind::Jpg, magic: "ffd8ffe0" },
    Signature { kind: FileKind::Png, magic: "89504e47" },
    Signature { kind: FileKind::Pdf, magic: "25504446" },
    Signature { kind: FileKind::Zip, magic: "504b0304" },
    Signature { kind: FileKind::Json, magic: "7b" },
    Signature { kind: FileKind::XmlOrHtml, magic: "3c" },
];

const JPG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
const PNG_HEADER: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const PDF_HEADER: [u8; 4] = [0x25, 0x50, 0x44, 0x46];

/// Canonical header bytes written over the start of a damaged buffer.
/// Kinds without a template are left untouched by header repair.
pub fn header_template(kind: FileKind) -> Option<&'static [u8]> {
    match kind {
        FileKind::Jpg => Some(&JPG_HEADER),
        FileKind::Png => Some(&PNG_HEADER),
        FileKind::Pdf => Some(&PDF_HEADER),
        FileKind::Zip | FileKind::Json | FileKind::XmlOrHtml | FileKind::Unknown => None,
    }
}

/// Lowercase hex of up to the first `SIGNATURE_LEN` bytes
pub fn leading_hex(data: &[u8]) -> String {
    data.iter()
        .take(SIGNATURE_LEN)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Identify the format of `data` from its leading bytes.
///
/// Buffers shorter than `SIGNATURE_LEN` are never classified. Anything that
/// matches no signature is `Unknown`; this never fails.
pub fn classify(data: &[u8]) -> FileKind {
    if data.len() < SIGNATURE_LEN {
        return FileKind::Unknown;
    }

    let hex = leading_hex(data);
    SIGNATURES
        .iter()
        .find(|sig| hex.starts_with(sig.magic))
        .map(|sig| sig.kind)
        .unwrap_or(FileKind::Unknown)
}
