//! Configuration types for the revalidation hook
//!
//! Two kinds of configuration live here:
//!
//! - [`SiteOptions`]: what an administrator sets (front-end URL and shared
//!   secret). Read through a [`ConfigProvider`](crate::traits::ConfigProvider)
//!   at notification time. Absence is a normal state, never validated.
//! - [`RevalidateConfig`]: process settings for delivery and the engine.

use serde::{Deserialize, Serialize};

/// Path appended to the front-end base URL
pub const REVALIDATE_PATH: &str = "/api/revalidate";

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Options set by a site administrator
///
/// Field names match the keys of the stored option document. The Debug
/// implementation never exposes the secret.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOptions {
    /// Base URL of the front-end (e.g. "https://site.example")
    #[serde(default)]
    pub nextjs_url: Option<String>,

    /// Shared secret sent in the `x-webhook-secret` header
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl SiteOptions {
    /// Create options with both values set
    pub fn new(nextjs_url: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            nextjs_url: Some(nextjs_url.into()),
            webhook_secret: Some(webhook_secret.into()),
        }
    }

    /// Resolve the endpoint to notify
    ///
    /// # Returns
    ///
    /// - `Ok(Endpoint)`: Both values are present and non-empty
    /// - `Err(Error::ConfigurationMissing)`: Either value is absent or empty
    pub fn endpoint(&self) -> Result<Endpoint, crate::Error> {
        let url = match self.nextjs_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(crate::Error::configuration_missing("nextjs_url is not set")),
        };

        let secret = match self.webhook_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                return Err(crate::Error::configuration_missing(
                    "webhook_secret is not set",
                ));
            }
        };

        Ok(Endpoint {
            revalidate_url: format!("{}{}", trim_trailing_slash(url), REVALIDATE_PATH),
            secret: secret.to_string(),
        })
    }
}

impl std::fmt::Debug for SiteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteOptions")
            .field("nextjs_url", &self.nextjs_url)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// A fully resolved notification target
///
/// The Debug implementation never exposes the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    revalidate_url: String,
    secret: String,
}

impl Endpoint {
    /// Full URL of the revalidate route
    pub fn revalidate_url(&self) -> &str {
        &self.revalidate_url
    }

    /// Shared secret
    /// ⚠️ NEVER log this value
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("revalidate_url", &self.revalidate_url)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Strip every trailing `/` from a URL
pub fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Process settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevalidateConfig {
    /// Outbound HTTP settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RevalidateConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.delivery.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of redirects to follow
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl DeliveryConfig {
    /// Validate the delivery configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Delivery timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the engine event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    /// Delivery itself is never affected.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_redirects() -> usize {
    5
}

fn default_event_channel_capacity() -> usize {
    1000
}
