//! New-mail notifications.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::Result;

/// What a recipient is told about a newly stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Decoded sender, if the message had one.
    pub from: Option<String>,
    /// Recipient address.
    pub to: String,
    /// Decoded subject.
    pub subject: String,
    /// Link to the stored message.
    pub view_url: String,
    /// When the message was accepted.
    pub received_at: DateTime<Utc>,
}

/// Sends new-mail notifications.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    fn notify(&self, notification: &Notification) -> impl Future<Output = Result<()>> + Send;
}

/// Notifier that writes each notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            to = %notification.to,
            from = notification.from.as_deref().unwrap_or("-"),
            subject = %notification.subject,
            view_url = %notification.view_url,
            "new message"
        );
        Ok(())
    }
}

/// Notifier that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}
