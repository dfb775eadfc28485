// # Config Provider Trait
//
// Read interface to the configuration an administrator maintains
// elsewhere (settings screen, option table, environment).
//
// ## Implementations
//
// - In-memory: `provider::MemoryConfigProvider`
// - JSON option file: `provider::FileConfigProvider`
//
// ## Usage
//
// ```rust,ignore
// use revalidate_core::ConfigProvider;
//
// let options = provider.site_options().await?;
// match options.endpoint() {
//     Ok(endpoint) => { /* notify */ }
//     Err(_) => { /* not configured yet, nothing to do */ }
// }
// ```

use async_trait::async_trait;

use crate::config::SiteOptions;

/// Trait for configuration provider implementations
///
/// # Read-Only
///
/// The core never writes configuration. Implementations may change their
/// answer between calls (an administrator edited the settings), so the
/// notifier asks again for every request.
///
/// # Absence
///
/// Returning `SiteOptions::default()` is the correct answer when nothing
/// has been configured. Errors are reserved for a source that exists but
/// cannot be read.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get the current site options
    ///
    /// # Returns
    ///
    /// - `Ok(SiteOptions)`: Current options (possibly empty)
    /// - `Err(Error)`: The source could not be read
    async fn site_options(&self) -> Result<SiteOptions, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
