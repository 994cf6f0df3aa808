//! Error types for MIME operations.
//!
//! Malformed message content never produces an [`Error`]; it is recovered
//! from and reported as a [`Fallback`](crate::Fallback). Only misuse of
//! the API surfaces here.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Multipart walking was requested for a content type without a boundary.
    #[error("Missing boundary in multipart content type")]
    MissingBoundary,

    /// Multipart walking was requested for a non-multipart content type.
    #[error("Not a multipart content type: {0}")]
    NotMultipart(String),
}
