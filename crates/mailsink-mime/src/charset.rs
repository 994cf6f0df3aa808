//! Charset label normalization and decoding.
//!
//! Decoding goes through `encoding_rs`. Labels it does not know, and labels
//! it maps to the WHATWG "replacement" encoding, fall back to a lossless
//! byte-per-character (Latin-1) mapping.

use encoding_rs::Encoding;
use tracing::debug;

use crate::outcome::{Decoded, Fallback};

/// Normalizes a charset label.
///
/// Lowercases, trims surrounding whitespace and quotes, turns `_` into `-`
/// and maps the legacy Japanese aliases onto one canonical label each.
/// Unknown labels pass through in their normalized spelling.
#[must_use]
pub fn normalize_charset(label: &str) -> String {
    let label = label
        .trim()
        .trim_matches('"')
        .trim()
        .to_ascii_lowercase()
        .replace('_', "-");

    match label.as_str() {
        "shift-jis" | "sjis" | "x-sjis" | "csshiftjis" | "ms-kanji" | "cp932" | "windows-31j" => {
            "shift-jis".to_string()
        }
        "euc-jp" | "x-euc-jp" | "cseucpkdfmtjapanese" => "euc-jp".to_string(),
        "iso-2022-jp" | "iso2022jp" | "csiso2022jp" => "iso-2022-jp".to_string(),
        _ => label,
    }
}

/// Looks up the decoder for a label, after normalization.
///
/// Returns `None` for unknown labels and for the replacement encoding.
#[must_use]
pub fn encoding_for(label: &str) -> Option<&'static Encoding> {
    let normalized = normalize_charset(label);
    Encoding::for_label(normalized.as_bytes())
        .filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
}

/// Decodes bytes as text in the given charset.
///
/// Malformed sequences become U+FFFD and are reported as
/// [`Fallback::MalformedCharsetBytes`]; an unsupported label maps each byte
/// to the code point of the same value and reports
/// [`Fallback::UnsupportedCharset`].
#[must_use]
pub fn decode_charset(bytes: &[u8], label: &str) -> Decoded<String> {
    let Some(encoding) = encoding_for(label) else {
        debug!(charset = %label, "unsupported charset, mapping bytes as latin-1");
        return Decoded::fallback(
            latin1(bytes),
            Fallback::UnsupportedCharset {
                label: label.to_string(),
            },
        );
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        debug!(charset = encoding.name(), "invalid byte sequence while decoding");
        return Decoded::fallback(
            text.into_owned(),
            Fallback::MalformedCharsetBytes {
                label: encoding.name().to_string(),
            },
        );
    }
    Decoded::clean(text.into_owned())
}

/// Maps every byte to the code point of the same value.
#[must_use]
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
