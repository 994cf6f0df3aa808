//! Service configuration.

use std::time::Duration;

use mailsink_mime::DecodeOptions;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default number of messages a mailbox accepts per window.
pub const DEFAULT_MAX_MESSAGES: u32 = 50;

/// Default rate limit window, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 3600;

/// Per-mailbox inbound rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    /// Messages accepted per window.
    pub max_messages: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

impl RateLimit {
    /// Returns the window as a duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Delivery service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Domain whose recipients are accepted.
    pub domain: String,
    /// Base URL that stored message keys are appended to.
    pub view_base_url: String,
    /// Optional cap on raw message size, in bytes.
    #[serde(default)]
    pub max_message_bytes: Option<usize>,
    /// Inbound rate limit.
    #[serde(default)]
    pub rate_limit: RateLimit,
    /// MIME decoding options.
    #[serde(default)]
    pub decode: DecodeOptions,
}

impl Config {
    /// Creates a configuration for `domain` with default settings.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self::builder(domain).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(domain: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(domain)
    }

    /// Loads a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the JSON is invalid or lacks
    /// `domain` or `view_base_url`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the link under which a stored message can be viewed.
    #[must_use]
    pub fn view_url(&self, key: &str) -> String {
        format!("{}/{key}", self.view_base_url.trim_end_matches('/'))
    }
}

/// Builder for service configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    domain: String,
    view_base_url: Option<String>,
    max_message_bytes: Option<usize>,
    rate_limit: RateLimit,
    decode: DecodeOptions,
}

impl ConfigBuilder {
    /// Creates a new builder for the given domain.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            view_base_url: None,
            max_message_bytes: None,
            rate_limit: RateLimit::default(),
            decode: DecodeOptions::default(),
        }
    }

    /// Sets the view base URL.
    #[must_use]
    pub fn view_base_url(mut self, url: impl Into<String>) -> Self {
        self.view_base_url = Some(url.into());
        self
    }

    /// Sets the raw message size cap.
    #[must_use]
    pub const fn max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = Some(limit);
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub const fn rate_limit(mut self, max_messages: u32, window_secs: u64) -> Self {
        self.rate_limit = RateLimit {
            max_messages,
            window_secs,
        };
        self
    }

    /// Sets the MIME decoding options.
    #[must_use]
    pub fn decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    /// Builds the configuration.
    ///
    /// Without an explicit view base URL, `https://<domain>/messages` is used.
    #[must_use]
    pub fn build(self) -> Config {
        let view_base_url = self
            .view_base_url
            .unwrap_or_else(|| format!("https://{}/messages", self.domain));
        Config {
            domain: self.domain,
            view_base_url,
            max_message_bytes: self.max_message_bytes,
            rate_limit: self.rate_limit,
            decode: self.decode,
        }
    }
}
