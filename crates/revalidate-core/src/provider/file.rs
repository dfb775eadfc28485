// # File Config Provider
//
// Reads site options from a JSON option document.
//
// ## Purpose
//
// The settings screen that owns the options lives in the host system. It
// exports them to a file; this provider reads that file on every call, so
// an edit takes effect on the next event without a restart.
//
// ## File Format
//
// Either the bare option object:
//
// ```json
// { "nextjs_url": "https://site.example", "webhook_secret": "abc" }
// ```
//
// or the same object under the option name the host stores it as:
//
// ```json
// { "nextjs_revalidate_options": { "nextjs_url": "...", "webhook_secret": "..." } }
// ```
//
// ## Missing vs. Broken
//
// - No file: nothing configured yet (`SiteOptions::default()`)
// - Unreadable or unparseable file: configuration error

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

use crate::Error;
use crate::config::SiteOptions;
use crate::traits::config_provider::ConfigProvider;

/// Option name the host stores the settings under
pub const OPTION_NAME: &str = "nextjs_revalidate_options";

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionDocument {
    Named {
        nextjs_revalidate_options: SiteOptions,
    },
    Bare(SiteOptions),
}

impl OptionDocument {
    fn into_options(self) -> SiteOptions {
        match self {
            Self::Named {
                nextjs_revalidate_options,
            } => nextjs_revalidate_options,
            Self::Bare(options) => options,
        }
    }
}

/// File-backed config provider
///
/// # Example
///
/// ```rust,no_run
/// use revalidate_core::provider::FileConfigProvider;
/// use revalidate_core::traits::ConfigProvider;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = FileConfigProvider::new("/etc/revalidate/options.json");
///     let options = provider.site_options().await?;
///     println!("configured: {}", options.endpoint().is_ok());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    /// Create a provider for the given file
    ///
    /// The file does not need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the option document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SiteOptions, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Option file does not exist: {}", self.path.display());
                return Ok(SiteOptions::default());
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "Failed to read option file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(SiteOptions::default());
        }

        let document: OptionDocument = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse option file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(document.into_options())
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn site_options(&self) -> Result<SiteOptions, Error> {
        self.load().await
    }

    fn provider_name(&self) -> &'static str {
        "file"
    }
}
