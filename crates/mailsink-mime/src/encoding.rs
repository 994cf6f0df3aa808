//! Content-Transfer-Encoding handling.
//!
//! Supports Base64 and Quoted-Printable (RFC 2045). Decoding a body never
//! fails outright: a body whose transfer encoding is broken is returned
//! undecoded, with the failure recorded as a [`Fallback`].

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use std::fmt;
use std::fmt::Write as _;
use tracing::debug;

use crate::charset::decode_charset;
use crate::header::HeaderBlock;
use crate::outcome::{Decoded, Fallback};
use crate::split::trim_bytes;

/// Standard alphabet, padding optional on decode.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Maximum line length for Quoted-Printable encoding.
const MAX_LINE_LENGTH: usize = 76;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Binary (no encoding).
    Binary,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    ///
    /// Unknown encodings are treated as 7bit, i.e. passed through.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::SevenBit,
        }
    }

    /// Resolves `Content-Transfer-Encoding`, defaulting to 7bit.
    #[must_use]
    pub fn from_headers(headers: &HeaderBlock) -> Self {
        headers
            .get("content-transfer-encoding")
            .map_or(Self::SevenBit, Self::parse)
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Binary => write!(f, "binary"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Transfer decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// `=` not followed by two hex digits or a line break.
    #[error("Invalid quoted-printable escape at offset {0}")]
    InvalidEscape(usize),

    /// Encoded-word encoding other than `B` or `Q`.
    #[error("Unknown encoded-word encoding: {0}")]
    UnknownEncoding(String),
}

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decodes Base64 data, ignoring any whitespace in it.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Encodes bytes that are not printable ASCII or would interfere
/// with email transmission.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::new();
    let mut line_length = 0;

    for &byte in data {
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(char::from(byte));
                line_length += 1;
            }
            // Space is literal except where it would end a line.
            b' ' if line_length < MAX_LINE_LENGTH - 4 => {
                result.push(' ');
                line_length += 1;
            }
            _ => {
                let _ = write!(result, "={byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Soft line breaks (`=` before `\r\n` or `\n`, optionally with trailing
/// blanks in between, or a lone `=` at the very end) are removed and
/// `=XX` escapes become the byte they name. Other bytes pass through.
///
/// # Errors
///
/// Returns an error if an `=` starts neither a soft break nor a valid escape.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        let rest = &data[i + 1..];
        let blanks = rest
            .iter()
            .take_while(|b| **b == b' ' || **b == b'\t')
            .count();
        let after_blanks = &rest[blanks..];
        if after_blanks.is_empty() {
            break;
        }
        if after_blanks.starts_with(b"\r\n") {
            i += 1 + blanks + 2;
            continue;
        }
        if after_blanks.starts_with(b"\n") {
            i += 1 + blanks + 1;
            continue;
        }

        match (
            rest.first().copied().and_then(hex_value),
            rest.get(1).copied().and_then(hex_value),
        ) {
            (Some(high), Some(low)) => {
                result.push((high << 4) | low);
                i += 3;
            }
            _ => return Err(DecodeError::InvalidEscape(i)),
        }
    }

    Ok(result)
}

/// Value of one hexadecimal digit, either case.
pub(crate) const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Removes a trailing closing delimiter line and surrounding whitespace.
///
/// A part body sliced out of its multipart parent sometimes still ends
/// with the parent's `--boundary--` line. The last line is dropped when it
/// is `--`, boundary characters including at least one letter or digit,
/// then `--`.
#[must_use]
pub fn strip_boundary_remnant(body: &[u8]) -> &[u8] {
    let body = trim_bytes(body);
    let line_start = body.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    let last_line = trim_bytes(&body[line_start..]);

    let is_remnant = last_line.len() > 4
        && last_line.starts_with(b"--")
        && last_line.ends_with(b"--")
        && last_line[2..last_line.len() - 2]
            .iter()
            .all(|b| is_boundary_char(*b))
        && last_line.iter().any(u8::is_ascii_alphanumeric);

    if is_remnant {
        trim_bytes(&body[..line_start])
    } else {
        body
    }
}

/// RFC 2046 `bcharsnospace`.
const fn is_boundary_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
        )
}

/// Reverses the transfer encoding of a body and decodes it as text.
///
/// The body is first stripped of boundary remnants and surrounding
/// whitespace. If the transfer encoding is invalid, the undecoded body is
/// charset-decoded instead.
#[must_use]
pub fn decode_body(body: &[u8], encoding: TransferEncoding, charset: &str) -> Decoded<String> {
    let body = strip_boundary_remnant(body);

    let transfer_decoded = match encoding {
        TransferEncoding::Base64 => decode_base64(body),
        TransferEncoding::QuotedPrintable => decode_quoted_printable(body),
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
            return decode_charset(body, charset);
        }
    };

    match transfer_decoded {
        Ok(bytes) => decode_charset(&bytes, charset),
        Err(e) => {
            debug!(%encoding, error = %e, "transfer decoding failed, keeping body undecoded");
            let mut decoded = decode_charset(body, charset);
            decoded.fallbacks.insert(
                0,
                Fallback::TransferDecode {
                    encoding: encoding.to_string(),
                    reason: e.to_string(),
                },
            );
            decoded
        }
    }
}
