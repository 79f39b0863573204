use std::borrow::Cow;

use crate::error::{reserve_buffer, Result};
use crate::signature::header_template;
use crate::types::FileKind;

/// Overwrite the leading bytes of `data` with the canonical header for `kind`.
///
/// The output has the same length as the input: the first N bytes come from
/// the template, everything from offset N on is copied from the original at
/// the same offset. Kinds without a template pass through borrowed.
pub fn repair_header(kind: FileKind, data: &[u8]) -> Result<Cow<'_, [u8]>> {
    let Some(template) = header_template(kind) else {
        return Ok(Cow::Borrowed(data));
    };

    let mut repaired = reserve_buffer(data.len())?;
    let head = template.len().min(data.len());
    repaired.extend_from_slice(&template[..head]);
    repaired.extend_from_slice(&data[head..]);

    Ok(Cow::Owned(repaired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::classify;

    #[test]
    fn test_jpeg_header_overwritten_in_place() {
        let damaged = [0x00, 0x00, 0x00, 0x00, 0x11, 0x22, 0x33];
        let repaired = repair_header(FileKind::Jpg, &damaged).unwrap();
        assert_eq!(&*repaired, &[0xFF, 0xD8, 0xFF, 0xE0, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_length_is_preserved() {
        let data = vec![0xAB; 100];
        for kind in [FileKind::Jpg, FileKind::Png, FileKind::Pdf] {
            assert_eq!(repair_header(kind, &data).unwrap().len(), 100);
        }
    }

    #[test]
    fn test_kinds_without_template_pass_through() {
        let data = b"PK\x03\x04payload";
        for kind in [FileKind::Zip, FileKind::Json, FileKind::XmlOrHtml, FileKind::Unknown] {
            let out = repair_header(kind, data).unwrap();
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(&*out, &data[..]);
        }
    }

    #[test]
    fn test_short_buffer_keeps_its_length() {
        let repaired = repair_header(FileKind::Png, &[0x01, 0x02]).unwrap();
        assert_eq!(&*repaired, &[0x89, 0x50]);
    }

    #[test]
    fn test_repaired_header_reclassifies_to_same_kind() {
        let inputs: [&[u8]; 3] = [
            &[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4],
            b"\x89PNG\r\n\x1a\nrest",
            b"%PDF-1.5\nbody",
        ];
        for input in inputs {
            let kind = classify(input);
            let repaired = repair_header(kind, input).unwrap();
            assert_eq!(classify(&repaired), kind);
        }
    }
}
