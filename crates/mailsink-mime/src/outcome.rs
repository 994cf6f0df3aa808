//! Best-effort decoding outcomes.
//!
//! Every decoding step in this crate produces a value. When a step had to
//! give up on the proper interpretation of its input it still returns its
//! best guess, and records why in a [`Fallback`].

use std::fmt;

/// Reason a decoding step used a lossy fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Fallback {
    /// No usable header/body or part structure was found.
    MalformedStructure {
        /// What was missing.
        detail: String,
    },
    /// The charset label has no decoder; bytes were mapped as Latin-1.
    UnsupportedCharset {
        /// Label as it appeared in the message.
        label: String,
    },
    /// The charset decoder met invalid byte sequences and substituted
    /// replacement characters.
    MalformedCharsetBytes {
        /// Normalized label of the decoder.
        label: String,
    },
    /// Base64 or quoted-printable data was invalid; the body was kept undecoded.
    TransferDecode {
        /// Transfer encoding that failed.
        encoding: String,
        /// Decoder error message.
        reason: String,
    },
    /// An RFC 2047 encoded-word could not be decoded and was kept literally.
    EncodedWord {
        /// The literal token.
        token: String,
    },
    /// Multipart nesting exceeded the configured depth; the raw branch body was used.
    DepthLimit {
        /// Depth at which walking stopped.
        depth: usize,
    },
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedStructure { detail } => write!(f, "malformed structure: {detail}"),
            Self::UnsupportedCharset { label } => write!(f, "unsupported charset: {label}"),
            Self::MalformedCharsetBytes { label } => {
                write!(f, "invalid byte sequence for charset {label}")
            }
            Self::TransferDecode { encoding, reason } => {
                write!(f, "{encoding} decode failed: {reason}")
            }
            Self::EncodedWord { token } => write!(f, "undecodable encoded-word: {token}"),
            Self::DepthLimit { depth } => write!(f, "multipart nesting deeper than {depth}"),
        }
    }
}

/// A decoded value together with the fallbacks used to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded value (best effort).
    pub value: T,
    /// Fallbacks taken, in the order they happened.
    pub fallbacks: Vec<Fallback>,
}

impl<T> Decoded<T> {
    /// Wraps a value that decoded without any fallback.
    #[must_use]
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            fallbacks: Vec::new(),
        }
    }

    /// Wraps a value produced by a single fallback.
    #[must_use]
    pub fn fallback(value: T, fallback: Fallback) -> Self {
        Self {
            value,
            fallbacks: vec![fallback],
        }
    }

    /// Returns true if no fallback was used.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }

    /// Maps the value, keeping the recorded fallbacks.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            fallbacks: self.fallbacks,
        }
    }

    /// Moves the fallbacks into `sink` and returns the bare value.
    pub fn merge_into(self, sink: &mut Vec<Fallback>) -> T {
        sink.extend(self.fallbacks);
        self.value
    }

    /// Discards the fallback record.
    pub fn into_value(self) -> T {
        self.value
    }
}
