//! Output text encodings

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{SyncError, SyncResult};

/// Look up an encoding label (`utf-8` when unset or blank)
///
/// Decode-only labels such as `replacement` are rejected.
pub fn resolve_encoding(label: Option<&str>) -> SyncResult<&'static Encoding> {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(UTF_8);
    };
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) if is_utf16(encoding) || encoding.output_encoding() == encoding => {
            Ok(encoding)
        }
        _ => Err(SyncError::UnknownEncoding {
            label: label.to_string(),
        }),
    }
}

/// Encode compiler output. Characters the encoding cannot represent are
/// written as numeric character references.
pub fn encode_text(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    // encoding_rs only encodes UTF-16 as UTF-8.
    if encoding == UTF_16LE {
        return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    }
    if encoding == UTF_16BE {
        return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    }
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}
