//! # mailsink-core
//!
//! Inbound delivery for `mailsink`.
//!
//! This crate provides:
//! - Recipient validation and routing to per-user mailboxes
//! - Message storage, rate limiting and notification interfaces
//! - In-memory implementations of those interfaces
//! - The delivery [`Service`], which decodes messages with `mailsink-mime`
//!
//! ```
//! use mailsink_core::{Config, FixedWindowLimiter, MemoryStore, NoopNotifier, Service};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mailsink_core::Result<()> {
//! let store = MemoryStore::new();
//! store.provision("alice").await;
//!
//! let service = Service::new(
//!     Config::new("sink.example"),
//!     store,
//!     NoopNotifier,
//!     FixedWindowLimiter::new(),
//! );
//! let receipt = service
//!     .deliver("alice@sink.example", b"Subject: Hi\r\n\r\nHello\r\n")
//!     .await?;
//! assert_eq!(receipt.subject, "Hi");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod address;
pub mod config;
mod error;
pub mod limit;
pub mod notify;
pub mod service;
pub mod store;
pub mod time;

pub use address::{AddressError, extract_username, validate_email};
pub use config::{Config, ConfigBuilder, RateLimit};
pub use error::{Error, Result};
pub use limit::{FixedWindowLimiter, Quota, RateLimiter};
pub use notify::{LoggingNotifier, NoopNotifier, Notification, Notifier};
pub use service::{Receipt, Service};
pub use store::{Mailbox, MailboxStatus, MemoryStore, MessageStore, StoredMessage};
