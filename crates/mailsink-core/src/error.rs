//! Error types for the delivery service.

use thiserror::Error;

use crate::address::AddressError;

/// Errors that can occur while accepting a message.
#[derive(Debug, Error)]
pub enum Error {
    /// Recipient address is malformed.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(#[from] AddressError),

    /// Recipient is not on the served domain.
    #[error("Recipient {0} is not on this domain")]
    UnknownDomain(String),

    /// No mailbox is provisioned for the recipient.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// The mailbox exists but its rental has run out.
    #[error("Address expired: {0}")]
    AddressExpired(String),

    /// The mailbox exists but inbound email is switched off for it.
    #[error("Email is not enabled for {0}")]
    MailboxDisabled(String),

    /// The recipient has used up its quota for the current window.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Raw message exceeds the configured size cap.
    #[error("Message too large: {size} bytes (limit {limit})")]
    MessageTooLarge {
        /// Size of the rejected message.
        size: usize,
        /// Configured cap.
        limit: usize,
    },

    /// Message store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Notification delivery failed.
    #[error("Notify error: {0}")]
    Notify(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
