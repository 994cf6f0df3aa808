//! Message-level extraction: subject, date and readable body.

use tracing::debug;

use crate::content_type::ContentTypeInfo;
use crate::encoding::{TransferEncoding, decode_body};
use crate::header::{HeaderBlock, unfold};
use crate::multipart::{DecodedContent, walk_multipart};
use crate::outcome::{Decoded, Fallback};
use crate::rfc2047::decode_header_value;
use crate::split::find_blank_line;

/// Subject reported for messages without one.
pub const DEFAULT_SUBJECT: &str = "(no subject)";

/// Default cap on multipart nesting.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Decoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeOptions {
    /// Maximum number of multipart levels walked.
    pub max_depth: usize,
    /// Subject used when the message has none.
    pub default_subject: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl DecodeOptions {
    /// Creates an options builder.
    #[must_use]
    pub fn builder() -> DecodeOptionsBuilder {
        DecodeOptionsBuilder::default()
    }
}

/// Builder for decoding options.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptionsBuilder {
    options: DecodeOptions,
}

impl DecodeOptionsBuilder {
    /// Sets the multipart nesting cap.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Sets the subject used when the message has none.
    #[must_use]
    pub fn default_subject(mut self, subject: impl Into<String>) -> Self {
        self.options.default_subject = subject.into();
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> DecodeOptions {
        self.options
    }
}

/// Everything callers need from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtractedMessage {
    /// Decoded subject, or the default subject.
    pub subject: String,
    /// Decoded `From` header.
    pub from: Option<String>,
    /// Decoded `To` header.
    pub to: Option<String>,
    /// Raw `Message-ID` header.
    pub message_id: Option<String>,
    /// Raw `Date` header, unparsed.
    pub date: Option<String>,
    /// Decoded `text/plain` body.
    pub body_text: Option<String>,
    /// Decoded `text/html` body.
    pub body_html: Option<String>,
}

/// Extracts a message with default options, discarding the fallback record.
#[must_use]
pub fn extract(raw: &[u8]) -> ExtractedMessage {
    extract_with(raw, &DecodeOptions::default()).into_value()
}

/// Extracts subject, date and body content from a raw message.
///
/// Never fails: malformed structure, charsets and encodings are recovered
/// from and listed in the returned fallbacks.
#[must_use]
pub fn extract_with(raw: &[u8], options: &DecodeOptions) -> Decoded<ExtractedMessage> {
    let mut fallbacks = Vec::new();

    let (header_bytes, body) = match find_blank_line(raw) {
        Some(blank) => (&raw[..blank.start], &raw[blank.body_start()..]),
        None => {
            debug!("no blank line after headers, treating message as body only");
            fallbacks.push(Fallback::MalformedStructure {
                detail: "no blank line separating headers from body".to_string(),
            });
            (&raw[..0], raw)
        }
    };
    let headers = HeaderBlock::parse(header_bytes);
    if headers.is_empty() {
        debug!("message has no header fields, using defaults");
    }

    let content = decode_content(&headers, body, options).merge_into(&mut fallbacks);

    let mut decoded_header = |name: &str| {
        decode_header(&headers, name).map(|value| value.merge_into(&mut fallbacks))
    };
    let subject = decoded_header("subject")
        .filter(|subject| !subject.trim().is_empty())
        .unwrap_or_else(|| options.default_subject.clone());
    let from = decoded_header("from");
    let to = decoded_header("to");

    let message = ExtractedMessage {
        subject,
        from,
        to,
        message_id: headers.get("message-id").map(ToOwned::to_owned),
        date: headers.get("date").map(ToOwned::to_owned),
        body_text: content.text,
        body_html: content.html,
    };

    if !fallbacks.is_empty() {
        debug!(fallbacks = fallbacks.len(), "message decoded with fallbacks");
    }

    Decoded {
        value: message,
        fallbacks,
    }
}

/// Decodes the body content of a message or part given its headers.
///
/// Multipart bodies are walked; anything else is decoded as a single body
/// and classified as HTML for `text/html`, as text otherwise. A multipart
/// type without a boundary is decoded as a single text body.
#[must_use]
pub fn decode_content(
    headers: &HeaderBlock,
    body: &[u8],
    options: &DecodeOptions,
) -> Decoded<DecodedContent> {
    let content_type = ContentTypeInfo::from_headers(headers);
    let mut fallbacks = Vec::new();

    if content_type.is_multipart() {
        match walk_multipart(&content_type, body, options.max_depth) {
            Ok(walked) => return walked,
            Err(e) => {
                debug!(error = %e, "cannot walk multipart body, decoding it as one part");
                fallbacks.push(Fallback::MalformedStructure {
                    detail: e.to_string(),
                });
            }
        }
    }

    let text = decode_body(
        body,
        TransferEncoding::from_headers(headers),
        &content_type.charset,
    )
    .merge_into(&mut fallbacks);

    let value = if content_type.is_text_html() {
        DecodedContent {
            text: None,
            html: Some(text),
        }
    } else {
        DecodedContent {
            text: Some(text),
            html: None,
        }
    };

    Decoded { value, fallbacks }
}

/// Unfolds and RFC 2047-decodes the first header of the given name.
#[must_use]
pub fn decode_header(headers: &HeaderBlock, name: &str) -> Option<Decoded<String>> {
    headers
        .get(name)
        .map(|value| decode_header_value(&unfold(value)))
}

/// Returns the single body to display for a raw message.
///
/// Prefers `text/plain`, then `text/html`, then the raw body as received.
#[must_use]
pub fn extract_body(raw: &[u8]) -> String {
    let (header_bytes, body) = crate::split::split_header_body(raw);
    let headers = HeaderBlock::parse(header_bytes);
    let content = decode_content(&headers, body, &DecodeOptions::default()).into_value();

    content
        .preferred()
        .map_or_else(|| String::from_utf8_lossy(body).into_owned(), ToOwned::to_owned)
}
