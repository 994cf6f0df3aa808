//! # mailsink-mime
//!
//! Best-effort MIME decoding for inbound email.
//!
//! ## Features
//!
//! - **Section splitting**: header/body split tolerant of mixed `\r\n`/`\n` line endings
//! - **Multipart**: nested multipart walking with a depth cap, text/HTML selection
//! - **Transfer encodings**: Base64, Quoted-Printable, 7bit/8bit/binary pass-through
//! - **Charsets**: `encoding_rs` decoders, Japanese legacy aliases, Latin-1 fallback
//! - **Headers**: RFC 2047 encoded-words with per-word failure isolation
//!
//! Decoding never fails on malformed content. Every lossy recovery is
//! recorded as a [`Fallback`] in the [`Decoded`] result so callers can tell
//! a clean decode from a best guess.
//!
//! ## Quick Start
//!
//! ```
//! use mailsink_mime::extract;
//!
//! let raw = "From: sender@example.com\r\n\
//!            Subject: =?UTF-8?B?5pel5pys6Kqe?=\r\n\
//!            Content-Type: text/plain; charset=utf-8\r\n\
//!            \r\n\
//!            Hello, World!\r\n";
//!
//! let message = extract(raw.as_bytes());
//! assert_eq!(message.subject, "日本語");
//! assert_eq!(message.body_text.as_deref(), Some("Hello, World!"));
//! ```
//!
//! ### Observing fallbacks
//!
//! ```
//! use mailsink_mime::{DecodeOptions, Fallback, extract_with};
//!
//! let raw = b"Subject: =?x-unknown?Q?caf=E9?=\n\nbody";
//! let decoded = extract_with(raw, &DecodeOptions::default());
//! assert!(!decoded.is_clean());
//! assert!(matches!(decoded.fallbacks[0], Fallback::UnsupportedCharset { .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod extract;
mod header;
mod multipart;
mod outcome;

pub mod charset;
pub mod encoding;
pub mod rfc2047;
pub mod split;

pub use content_type::{ContentTypeInfo, DEFAULT_CHARSET, Parameters};
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use extract::{
    DEFAULT_MAX_DEPTH, DEFAULT_SUBJECT, DecodeOptions, DecodeOptionsBuilder, ExtractedMessage,
    decode_content, decode_header, extract, extract_body, extract_with,
};
pub use header::{HeaderBlock, unfold};
pub use multipart::{DecodedContent, MimePart, split_multipart, walk_multipart};
pub use outcome::{Decoded, Fallback};
