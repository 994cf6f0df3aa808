//! Multipart structure and text/HTML selection.

use tracing::debug;

use crate::content_type::ContentTypeInfo;
use crate::encoding::{TransferEncoding, decode_body};
use crate::error::{Error, Result};
use crate::header::HeaderBlock;
use crate::outcome::{Decoded, Fallback};
use crate::split::{find, split_part, trim_bytes};

/// Readable content recovered from a message or part tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedContent {
    /// Decoded `text/plain` content.
    pub text: Option<String>,
    /// Decoded `text/html` content.
    pub html: Option<String>,
}

impl DecodedContent {
    /// Returns true if neither kind was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.html.is_none()
    }

    /// Picks the single body to show: plain text first, then HTML.
    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        self.text.as_deref().or(self.html.as_deref())
    }

    /// Fills only the kinds that are still empty.
    fn adopt_missing(&mut self, other: Self) {
        if self.text.is_none() {
            self.text = other.text;
        }
        if self.html.is_none() {
            self.html = other.html;
        }
    }
}

/// MIME message part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart<'a> {
    /// Part headers.
    pub headers: HeaderBlock,
    /// Part body, still transfer-encoded.
    pub body: &'a [u8],
}

impl<'a> MimePart<'a> {
    /// Parses one segment of a multipart body into headers and body.
    #[must_use]
    pub fn parse(segment: &'a [u8]) -> Self {
        let (headers, body) = split_part(segment);
        Self {
            headers: HeaderBlock::parse(headers),
            body,
        }
    }

    /// Gets the content type.
    #[must_use]
    pub fn content_type(&self) -> ContentTypeInfo {
        ContentTypeInfo::from_headers(&self.headers)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::from_headers(&self.headers)
    }

    /// Decodes the body as text using the part's own transfer encoding
    /// and charset.
    #[must_use]
    pub fn decode_text(&self) -> Decoded<String> {
        let content_type = self.content_type();
        decode_body(self.body, self.transfer_encoding(), &content_type.charset)
    }

    /// Child parts of a multipart part; empty for leaves.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        match self.content_type().boundary {
            Some(boundary) => split_multipart(self.body, &boundary),
            None => Vec::new(),
        }
    }
}

/// Splits a multipart body on `--boundary` delimiters.
///
/// The preamble before the first delimiter and everything from the closing
/// `--boundary--` on are dropped, as are empty segments. Splitting stops at
/// the first segment starting with `--`, so parts placed after a closing
/// delimiter are never returned, unlike a plain split that would only
/// discard empty and `--` segments.
#[must_use]
pub fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<MimePart<'a>> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();
    let Some(first) = find(body, delimiter) else {
        return parts;
    };
    let mut rest = &body[first + delimiter.len()..];

    loop {
        let next = find(rest, delimiter);
        let segment = next.map_or(rest, |end| &rest[..end]);

        if segment.starts_with(b"--") {
            break;
        }

        let segment = trim_line_end(skip_delimiter_line(segment));
        if !trim_bytes(segment).is_empty() {
            parts.push(MimePart::parse(segment));
        }

        match next {
            Some(end) => rest = &rest[end + delimiter.len()..],
            None => break,
        }
    }

    parts
}

/// Drops transport padding and the line ending that end a delimiter line.
fn skip_delimiter_line(segment: &[u8]) -> &[u8] {
    let start = segment
        .iter()
        .position(|b| *b != b' ' && *b != b'\t')
        .unwrap_or(segment.len());
    let segment = &segment[start..];
    segment
        .strip_prefix(b"\r\n")
        .or_else(|| segment.strip_prefix(b"\n"))
        .unwrap_or(segment)
}

/// Drops the line ending that belongs to the following delimiter.
fn trim_line_end(segment: &[u8]) -> &[u8] {
    segment
        .strip_suffix(b"\r\n")
        .or_else(|| segment.strip_suffix(b"\n"))
        .unwrap_or(segment)
}

/// Walks a multipart body and collects its text and HTML content.
///
/// Among sibling leaves the last `text/plain` and the last `text/html`
/// win. A nested multipart only fills kinds that are still empty, so the
/// first nested multipart carrying a kind wins for that kind. Leaves
/// without a `Content-Type` count as `text/plain`; other media types are
/// ignored.
///
/// Nesting deeper than `max_depth` levels is not walked: the raw body of
/// that branch is used as its text and [`Fallback::DepthLimit`] is
/// recorded.
///
/// # Errors
///
/// Returns [`Error::NotMultipart`] or [`Error::MissingBoundary`] if
/// `content_type` is not a multipart type with a boundary.
pub fn walk_multipart(
    content_type: &ContentTypeInfo,
    body: &[u8],
    max_depth: usize,
) -> Result<Decoded<DecodedContent>> {
    if !content_type.is_multipart() {
        return Err(Error::NotMultipart(content_type.media_type.clone()));
    }
    let boundary = content_type
        .boundary
        .as_deref()
        .ok_or(Error::MissingBoundary)?;

    let mut fallbacks = Vec::new();
    let value = if max_depth == 0 {
        depth_limited(body, max_depth, &mut fallbacks)
    } else {
        walk(split_multipart(body, boundary), boundary, 1, max_depth, &mut fallbacks)
    };
    Ok(Decoded { value, fallbacks })
}

/// Stands in for a branch nested deeper than `max_depth`: its raw body.
fn depth_limited(body: &[u8], max_depth: usize, fallbacks: &mut Vec<Fallback>) -> DecodedContent {
    debug!(max_depth, "multipart nesting too deep, using raw body");
    fallbacks.push(Fallback::DepthLimit { depth: max_depth });
    DecodedContent {
        text: Some(String::from_utf8_lossy(trim_bytes(body)).into_owned()),
        html: None,
    }
}

fn walk(
    parts: Vec<MimePart<'_>>,
    boundary: &str,
    depth: usize,
    max_depth: usize,
    fallbacks: &mut Vec<Fallback>,
) -> DecodedContent {
    if parts.is_empty() {
        debug!(boundary, "no parts found for boundary");
        fallbacks.push(Fallback::MalformedStructure {
            detail: format!("no parts delimited by boundary {boundary:?}"),
        });
    }

    let mut content = DecodedContent::default();
    for part in parts {
        let part_type = part.content_type();

        if part_type.is_multipart() {
            let Some(nested) = part_type.boundary.as_deref() else {
                fallbacks.push(Fallback::MalformedStructure {
                    detail: format!("{} part without boundary", part_type.media_type),
                });
                continue;
            };
            let branch = if depth >= max_depth {
                depth_limited(part.body, max_depth, fallbacks)
            } else {
                walk(part.children(), nested, depth + 1, max_depth, fallbacks)
            };
            content.adopt_missing(branch);
        } else if part_type.is_text_plain() || part_type.media_type.is_empty() {
            content.text = Some(part.decode_text().merge_into(fallbacks));
        } else if part_type.is_text_html() {
            content.html = Some(part.decode_text().merge_into(fallbacks));
        }
    }

    content
}
