// # Memory Config Provider
//
// Settable in-memory site options. Used when configuration arrives once at
// startup (environment variables) and in tests that flip the options
// between events.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::SiteOptions;
use crate::traits::config_provider::ConfigProvider;

/// In-memory config provider
///
/// Cloning is cheap and clones share the same options.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    inner: Arc<RwLock<SiteOptions>>,
}

impl MemoryConfigProvider {
    /// Create a provider with nothing configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with the given options
    pub fn with_options(options: SiteOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(options)),
        }
    }

    /// Replace the options
    pub async fn set(&self, options: SiteOptions) {
        *self.inner.write().await = options;
    }

    /// Reset to "nothing configured"
    pub async fn clear(&self) {
        *self.inner.write().await = SiteOptions::default();
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn site_options(&self) -> Result<SiteOptions, Error> {
        Ok(self.inner.read().await.clone())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
