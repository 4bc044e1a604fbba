//! Byte-to-text decoding with a fixed fallback order.
//!
//! Order: UTF-8 (BOM optional) → UTF-16 (BOM required) → Shift_JIS → EUC-JP
//! → ISO-8859-1. The last step maps every byte to one character and never
//! fails, so only binary content (NUL bytes) is rejected.

use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_16BE, UTF_16LE};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decoded text plus the name of the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// Decode `bytes` with the first encoding that accepts them.
///
/// Returns `None` when the content looks binary.
pub fn decode(bytes: &[u8]) -> Option<Decoded> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return Some(decoded(text.to_string(), "utf-8"));
        }
    }
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        return strict(UTF_16LE, rest, "utf-16le");
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        return strict(UTF_16BE, rest, "utf-16be");
    }

    if looks_binary(bytes) {
        return None;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(decoded(text.to_string(), "utf-8"));
    }

    strict(SHIFT_JIS, bytes, "shift_jis")
        .or_else(|| strict(EUC_JP, bytes, "euc-jp"))
        .or_else(|| Some(decoded(latin1(bytes), "iso-8859-1")))
}

fn strict(encoding: &'static Encoding, bytes: &[u8], name: &'static str) -> Option<Decoded> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| decoded(text.into_owned(), name))
}

fn decoded(text: String, encoding: &'static str) -> Decoded {
    Decoded { text, encoding }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
