//! Inbound delivery.

use chrono::Utc;
use mailsink_mime::extract_with;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::address::{extract_username, validate_email};
use crate::config::Config;
use crate::limit::{Quota, RateLimiter};
use crate::notify::{Notification, Notifier};
use crate::store::{MailboxStatus, MessageStore, StoredMessage};
use crate::{Error, Result};

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Store key of the new message.
    pub key: String,
    /// Link to the stored message.
    pub view_url: String,
    /// Decoded subject.
    pub subject: String,
    /// False if decoding had to fall back anywhere.
    pub clean: bool,
}

/// Accepts raw messages for one domain and files them.
#[derive(Debug)]
pub struct Service<S, N, L> {
    config: Config,
    store: S,
    notifier: N,
    limiter: L,
}

impl<S, N, L> Service<S, N, L>
where
    S: MessageStore,
    N: Notifier,
    L: RateLimiter,
{
    /// Creates a service from its configuration and collaborators.
    pub const fn new(config: Config, store: S, notifier: N, limiter: L) -> Self {
        Self {
            config,
            store,
            notifier,
            limiter,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the message store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Delivers one raw message to `recipient`.
    ///
    /// Malformed MIME never fails a delivery; it only clears the
    /// receipt's `clean` flag. A failing notifier is logged and ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::MessageTooLarge`] if the message exceeds the size cap
    /// - [`Error::InvalidRecipient`] if the address is malformed
    /// - [`Error::UnknownDomain`] if the address is on another domain
    /// - [`Error::AddressNotFound`] if no mailbox exists for it
    /// - [`Error::AddressExpired`] if the mailbox is no longer active
    /// - [`Error::MailboxDisabled`] if inbound email is off for the mailbox
    /// - [`Error::RateLimited`] if the mailbox's window is full
    /// - any error returned by the store or limiter
    pub async fn deliver(&self, recipient: &str, raw: &[u8]) -> Result<Receipt> {
        if let Some(limit) = self.config.max_message_bytes
            && raw.len() > limit
        {
            return Err(Error::MessageTooLarge {
                size: raw.len(),
                limit,
            });
        }

        let recipient = recipient.trim();
        validate_email(recipient)?;
        let username = extract_username(recipient, &self.config.domain)
            .ok_or_else(|| Error::UnknownDomain(recipient.to_string()))?;

        let mailbox = self
            .store
            .mailbox(&username)
            .await?
            .ok_or_else(|| Error::AddressNotFound(recipient.to_string()))?;
        if mailbox.status != MailboxStatus::Active {
            return Err(Error::AddressExpired(recipient.to_string()));
        }
        if !mailbox.email_enabled {
            return Err(Error::MailboxDisabled(recipient.to_string()));
        }
        let received_at = Utc::now();
        if mailbox.is_expired_at(received_at) {
            return Err(Error::AddressExpired(recipient.to_string()));
        }

        match self
            .limiter
            .check(&username, &self.config.rate_limit)
            .await?
        {
            Quota::Remaining(remaining) => {
                debug!(username = %username, remaining, "within rate limit");
            }
            Quota::Denied => return Err(Error::RateLimited(username)),
        }

        let decoded = extract_with(raw, &self.config.decode);
        let clean = decoded.is_clean();
        if !clean {
            debug!(
                username = %username,
                fallbacks = decoded.fallbacks.len(),
                "message decoded with fallbacks"
            );
        }
        let message = decoded.value;

        let stored = StoredMessage {
            recipient: recipient.to_string(),
            from: message.from.clone(),
            subject: message.subject.clone(),
            date: message.date,
            body_text: message.body_text,
            body_html: message.body_html,
            received_at,
            clean,
        };
        let key = self.store.put(&username, stored).await?;
        let view_url = self.config.view_url(&key);

        let notification = Notification {
            from: message.from,
            to: recipient.to_string(),
            subject: message.subject.clone(),
            view_url: view_url.clone(),
            received_at,
        };
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!(error = %e, key = %key, "Failed to send notification");
        }

        info!(username = %username, key = %key, clean, "message delivered");
        Ok(Receipt {
            key,
            view_url,
            subject: message.subject,
            clean,
        })
    }
}
