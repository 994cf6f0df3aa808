//! Message storage.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// A delivered message as kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    /// Address the message was delivered to.
    pub recipient: String,
    /// Decoded `From` header.
    pub from: Option<String>,
    /// Decoded subject.
    pub subject: String,
    /// Raw `Date` header.
    pub date: Option<String>,
    /// Plain text body.
    pub body_text: Option<String>,
    /// HTML body.
    pub body_html: Option<String>,
    /// When the message was accepted.
    pub received_at: DateTime<Utc>,
    /// False if decoding had to fall back anywhere.
    pub clean: bool,
}

/// Lifecycle state of a mailbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxStatus {
    /// Accepting mail.
    #[default]
    Active,
    /// Rental ran out or was cancelled.
    Expired,
}

/// Delivery settings of one mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// Lifecycle state.
    pub status: MailboxStatus,
    /// Moment after which the mailbox stops accepting mail.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether inbound email is switched on for this mailbox.
    pub email_enabled: bool,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self {
            status: MailboxStatus::Active,
            expires_at: None,
            email_enabled: true,
        }
    }
}

impl Mailbox {
    /// Creates an active, enabled mailbox that expires at `expires_at`.
    #[must_use]
    pub fn until(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..Self::default()
        }
    }

    /// Returns true if the mailbox has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == MailboxStatus::Expired || self.expires_at.is_some_and(|at| now > at)
    }
}

/// Storage backend for delivered messages.
///
/// Mailboxes are keyed by username (the lowercased local part).
pub trait MessageStore: Send + Sync {
    /// Looks up the mailbox for `username`.
    fn mailbox(&self, username: &str) -> impl Future<Output = Result<Option<Mailbox>>> + Send;

    /// Stores a message in `username`'s mailbox and returns its key.
    fn put(
        &self,
        username: &str,
        message: StoredMessage,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Fetches a stored message by key.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<StoredMessage>>> + Send;
}

#[derive(Debug)]
struct Slot {
    settings: Mailbox,
    keys: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    mailboxes: HashMap<String, Slot>,
    messages: HashMap<String, StoredMessage>,
    next_seq: u64,
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store with no mailboxes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an active, enabled mailbox without expiry for `username`.
    pub async fn provision(&self, username: &str) {
        self.provision_with(username, Mailbox::default()).await;
    }

    /// Creates or updates the mailbox for `username` with the given settings.
    ///
    /// Messages already stored in an existing mailbox are kept.
    pub async fn provision_with(&self, username: &str, settings: Mailbox) {
        let mut inner = self.inner.write().await;
        inner
            .mailboxes
            .entry(username.to_lowercase())
            .and_modify(|slot| slot.settings = settings.clone())
            .or_insert_with(|| Slot {
                settings,
                keys: Vec::new(),
            });
    }

    /// Returns the messages in `username`'s mailbox, oldest first.
    pub async fn messages(&self, username: &str) -> Vec<StoredMessage> {
        let inner = self.inner.read().await;
        inner
            .mailboxes
            .get(&username.to_lowercase())
            .into_iter()
            .flat_map(|slot| &slot.keys)
            .filter_map(|key| inner.messages.get(key).cloned())
            .collect()
    }
}

impl MessageStore for MemoryStore {
    async fn mailbox(&self, username: &str) -> Result<Option<Mailbox>> {
        let inner = self.inner.read().await;
        Ok(inner
            .mailboxes
            .get(username)
            .map(|slot| slot.settings.clone()))
    }

    async fn put(&self, username: &str, message: StoredMessage) -> Result<String> {
        let mut inner = self.inner.write().await;
        if !inner.mailboxes.contains_key(username) {
            return Err(Error::Store(format!("no mailbox for {username}")));
        }

        inner.next_seq += 1;
        let key = format!("{username}-{:06}", inner.next_seq);
        inner.messages.insert(key.clone(), message);
        if let Some(slot) = inner.mailboxes.get_mut(username) {
            slot.keys.push(key.clone());
        }

        debug!(username, key = %key, "message stored");
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<StoredMessage>> {
        Ok(self.inner.read().await.messages.get(key).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn message(subject: &str) -> StoredMessage {
        StoredMessage {
            recipient: "alice@sink.example".to_string(),
            from: Some("bob@example.com".to_string()),
            subject: subject.to_string(),
            date: None,
            body_text: Some("hi".to_string()),
            body_html: None,
            received_at: Utc::now(),
            clean: true,
        }
    }

    #[tokio::test]
    async fn test_provision_and_put() {
        let store = MemoryStore::new();
        assert!(store.mailbox("alice").await.unwrap().is_none());

        store.provision("Alice").await;
        assert_eq!(
            store.mailbox("alice").await.unwrap(),
            Some(Mailbox::default())
        );

        let first = store.put("alice", message("one")).await.unwrap();
        let second = store.put("alice", message("two")).await.unwrap();
        assert_ne!(first, second);

        let stored = store.get(&first).await.unwrap().unwrap();
        assert_eq!(stored.subject, "one");

        let subjects: Vec<_> = store
            .messages("ALICE")
            .await
            .into_iter()
            .map(|m| m.subject)
            .collect();
        assert_eq!(subjects, ["one", "two"]);
    }

    #[tokio::test]
    async fn test_put_without_mailbox() {
        let store = MemoryStore::new();
        let err = store.put("nobody", message("x")).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(store.get("nobody-000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reprovision_keeps_messages() {
        let store = MemoryStore::new();
        store.provision("alice").await;
        store.put("alice", message("kept")).await.unwrap();

        let disabled = Mailbox {
            email_enabled: false,
            ..Mailbox::default()
        };
        store.provision_with("alice", disabled.clone()).await;
        assert_eq!(store.mailbox("alice").await.unwrap(), Some(disabled));
        assert_eq!(store.messages("alice").await.len(), 1);
    }

    #[test]
    fn test_mailbox_expiry() {
        let now = Utc::now();
        assert!(!Mailbox::default().is_expired_at(now));
        assert!(!Mailbox::until(now + Duration::hours(1)).is_expired_at(now));
        assert!(Mailbox::until(now - Duration::seconds(1)).is_expired_at(now));

        let expired = Mailbox {
            status: MailboxStatus::Expired,
            ..Mailbox::default()
        };
        assert!(expired.is_expired_at(now));
    }

    #[test]
    fn test_stored_message_json() {
        let json = serde_json::to_value(message("hello")).unwrap();
        assert_eq!(json["subject"], "hello");
        assert_eq!(json["clean"], true);
        assert!(json["received_at"].as_str().unwrap().contains('T'));
    }
}
