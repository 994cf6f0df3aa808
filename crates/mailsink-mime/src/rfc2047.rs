//! RFC 2047 encoded-word decoding for header values.
//!
//! Format: `=?charset?encoding?encoded-text?=`

use tracing::debug;

use crate::charset::decode_charset;
use crate::encoding::{DecodeError, decode_base64, hex_value};
use crate::outcome::{Decoded, Fallback};

/// One syntactically recognised encoded-word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    payload: &'a str,
    /// Length of the whole token, `=?` through `?=`.
    len: usize,
}

impl<'a> EncodedWord<'a> {
    /// Recognises an encoded-word at the start of `s`.
    fn scan(s: &'a str) -> Option<Self> {
        let body = s.strip_prefix("=?")?;

        let charset_end = body.find('?')?;
        let charset = &body[..charset_end];
        let after_charset = &body[charset_end + 1..];

        let encoding_end = after_charset.find('?')?;
        let encoding = &after_charset[..encoding_end];
        let after_encoding = &after_charset[encoding_end + 1..];

        let payload_end = after_encoding.find('?')?;
        if after_encoding.as_bytes().get(payload_end + 1) != Some(&b'=') {
            return None;
        }
        let payload = &after_encoding[..payload_end];

        let blank = |part: &str| part.is_empty() || part.contains(char::is_whitespace);
        if blank(charset) || blank(encoding) {
            return None;
        }

        Some(Self {
            charset,
            encoding,
            payload,
            len: 2 + charset_end + 1 + encoding_end + 1 + payload_end + 2,
        })
    }

    fn decode(&self) -> Result<Decoded<String>, DecodeError> {
        let bytes = match self.encoding {
            "B" | "b" => decode_base64(self.payload.as_bytes())?,
            "Q" | "q" => decode_q(self.payload.as_bytes())?,
            other => return Err(DecodeError::UnknownEncoding(other.to_string())),
        };
        // RFC 2231 allows a language suffix: `charset*lang`.
        let charset = self
            .charset
            .split_once('*')
            .map_or(self.charset, |(charset, _)| charset);
        Ok(decode_charset(&bytes, charset))
    }
}

/// Decodes the "Q" encoding: `_` is a space, `=XX` is a byte.
fn decode_q(payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        match payload[i] {
            b'_' => {
                bytes.push(b' ');
                i += 1;
            }
            b'=' => {
                let high = payload.get(i + 1).copied().and_then(hex_value);
                let low = payload.get(i + 2).copied().and_then(hex_value);
                let (Some(high), Some(low)) = (high, low) else {
                    return Err(DecodeError::InvalidEscape(i));
                };
                bytes.push((high << 4) | low);
                i += 3;
            }
            other => {
                bytes.push(other);
                i += 1;
            }
        }
    }
    Ok(bytes)
}

/// Decodes every encoded-word in a header value.
///
/// The value should already be unfolded. Encoded-words are replaced left
/// to right; whitespace between two adjacent decoded words is dropped.
/// A word that fails to decode stays in the output verbatim and is
/// reported as [`Fallback::EncodedWord`], without affecting its neighbours.
#[must_use]
pub fn decode_header_value(value: &str) -> Decoded<String> {
    let mut out = String::with_capacity(value.len());
    let mut fallbacks = Vec::new();
    let mut rest = value;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);

        let Some(word) = EncodedWord::scan(candidate) else {
            out.push_str(before);
            out.push_str("=?");
            rest = &candidate[2..];
            after_word = false;
            continue;
        };

        let token = &candidate[..word.len];
        rest = &candidate[word.len..];

        match word.decode() {
            Ok(decoded) => {
                let adjacent = after_word && before.chars().all(char::is_whitespace);
                if !adjacent {
                    out.push_str(before);
                }
                out.push_str(&decoded.merge_into(&mut fallbacks));
                after_word = true;
            }
            Err(e) => {
                debug!(token, error = %e, "leaving undecodable encoded-word as is");
                out.push_str(before);
                out.push_str(token);
                fallbacks.push(Fallback::EncodedWord {
                    token: token.to_string(),
                });
                after_word = false;
            }
        }
    }
    out.push_str(rest);

    Decoded {
        value: out,
        fallbacks,
    }
}
