// # revalidated - Revalidation Bridge
//
// Thin integration layer between a host content-management system and the
// revalidation engine. All normalization and delivery logic lives in
// revalidate-core; this binary only wires components together.
//
// The bridge is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Translating hook calls read from stdin into lifecycle events
// 4. Running the engine until stdin closes or a shutdown signal arrives
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Front-end
// - `REVALIDATE_NEXTJS_URL`: Base URL of the front-end
// - `REVALIDATE_WEBHOOK_SECRET`: Shared secret
// - `REVALIDATE_OPTIONS_FILE`: JSON option document, re-read for every
//   event (takes precedence over the two variables above)
//
// ### Delivery
// - `REVALIDATE_TIMEOUT_SECS`: Request timeout, 1-60 (default 5)
// - `REVALIDATE_MAX_REDIRECTS`: Redirects to follow, 0-10 (default 5)
//
// ### Logging
// - `REVALIDATE_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export REVALIDATE_NEXTJS_URL=https://site.example
// export REVALIDATE_WEBHOOK_SECRET=your_secret
//
// echo '{"hook":"trashed_post","post_id":42,"post":{"post_type":"post"}}' | revalidated
// ```

mod wire;

use anyhow::Result;
use revalidate_core::{
    ConfigProvider, DeliveryConfig, FileConfigProvider, LifecycleEvent, MemoryConfigProvider,
    MemoryContentStore, RevalidateConfig, RevalidateEngine, SiteOptions,
};
use revalidate_http::HttpTransport;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::{Level, error, info, trace, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BridgeExitCode {
    /// Clean shutdown (stdin closed or signal received)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<BridgeExitCode> for ExitCode {
    fn from(code: BridgeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// How long to wait for a blocked stdin read when shutting down
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Application configuration
struct Config {
    nextjs_url: Option<String>,
    webhook_secret: Option<String>,
    options_file: Option<String>,
    timeout_secs: u64,
    max_redirects: usize,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            nextjs_url: env::var("REVALIDATE_NEXTJS_URL").ok(),
            webhook_secret: env::var("REVALIDATE_WEBHOOK_SECRET").ok(),
            options_file: env::var("REVALIDATE_OPTIONS_FILE").ok(),
            timeout_secs: parse_var("REVALIDATE_TIMEOUT_SECS", 5)?,
            max_redirects: parse_var("REVALIDATE_MAX_REDIRECTS", 5)?,
            log_level: env::var("REVALIDATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Missing front-end settings are not an error: events are then
    /// skipped, the same as on a site where nothing has been configured.
    fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.options_file
            && path.is_empty()
        {
            anyhow::bail!("REVALIDATE_OPTIONS_FILE cannot be empty when set");
        }

        if let Some(ref url) = self.nextjs_url
            && !url.is_empty()
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!(
                "REVALIDATE_NEXTJS_URL must use HTTP or HTTPS scheme. Got: {}",
                url
            );
        }

        if !(1..=60).contains(&self.timeout_secs) {
            anyhow::bail!(
                "REVALIDATE_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                self.timeout_secs
            );
        }

        if self.max_redirects > 10 {
            anyhow::bail!(
                "REVALIDATE_MAX_REDIRECTS must be between 0 and 10. Got: {}",
                self.max_redirects
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "REVALIDATE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn delivery(&self) -> DeliveryConfig {
        DeliveryConfig {
            timeout_secs: self.timeout_secs,
            max_redirects: self.max_redirects,
        }
    }

    fn config_provider(&self) -> Box<dyn ConfigProvider> {
        match self.options_file {
            Some(ref path) => Box::new(FileConfigProvider::new(path)),
            None => Box::new(MemoryConfigProvider::with_options(SiteOptions {
                nextjs_url: self.nextjs_url.clone(),
                webhook_secret: self.webhook_secret.clone(),
            })),
        }
    }
}

/// Read a numeric variable, falling back to a default when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is not a valid number ({}): {}", name, value, e)),
        Err(_) => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return BridgeExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return BridgeExitCode::ConfigError.into();
    }

    // Initialize tracing; stdout is left alone
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BridgeExitCode::ConfigError.into();
    }

    info!("Starting revalidated bridge");
    match config.options_file {
        Some(ref path) => info!("Reading site options from {}", path),
        None if config.nextjs_url.is_none() || config.webhook_secret.is_none() => {
            warn!("Front-end URL or secret not set, events will be skipped")
        }
        None => info!("Site options taken from environment"),
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BridgeExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_bridge(config).await {
            error!("Bridge error: {}", e);
            BridgeExitCode::RuntimeError
        } else {
            BridgeExitCode::CleanShutdown
        }
    });

    // A pending stdin read would otherwise keep the process alive
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    result.into()
}

/// Run the bridge until stdin closes or a shutdown signal arrives
async fn run_bridge(config: Config) -> Result<()> {
    let delivery = config.delivery();
    let transport = HttpTransport::new(&delivery)?;
    info!(
        "HTTP transport ready (timeout {:?}, up to {} redirects)",
        transport.timeout(),
        transport.max_redirects()
    );

    let store = MemoryContentStore::new();
    let (engine, mut engine_events) = RevalidateEngine::new(
        Box::new(store.clone()),
        config.config_provider(),
        Box::new(transport),
        RevalidateConfig {
            delivery,
            ..RevalidateConfig::default()
        },
    )?;

    // Outcomes are already logged by the notifier
    let observer = tokio::spawn(async move {
        while let Some(event) = engine_events.recv().await {
            trace!("Engine event: {:?}", event);
        }
    });

    let shutdown_rx = install_shutdown_signal()?;

    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let events = lines.filter_map(move |line| decode(line, &store));

    let result = engine.run_with_shutdown(events, Some(shutdown_rx)).await;

    drop(engine);
    if let Err(e) = observer.await {
        warn!("Engine event observer ended abnormally: {}", e);
    }

    info!("Shutting down bridge");
    result.map_err(anyhow::Error::from)
}

/// Turn one stdin line into a lifecycle event
///
/// Unreadable and malformed lines are logged and dropped.
fn decode(line: std::io::Result<String>, store: &MemoryContentStore) -> Option<LifecycleEvent> {
    let line = match line {
        Ok(line) => line,
        Err(e) => {
            warn!("Failed to read hook call from stdin: {}", e);
            return None;
        }
    };

    let call = match wire::parse_line(&line) {
        Ok(Some(call)) => call,
        Ok(None) => return None,
        Err(e) => {
            warn!("Skipping malformed hook call: {}", e);
            return None;
        }
    };

    match call.into_event(store) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Skipping hook call: {}", e);
            None
        }
    }
}

/// Install handlers for SIGTERM and SIGINT
///
/// The returned receiver fires on the first signal.
#[cfg(unix)]
fn install_shutdown_signal() -> Result<oneshot::Receiver<()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        let _ = tx.send(());
    });

    Ok(rx)
}

/// Install a handler for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn install_shutdown_signal() -> Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
        let _ = tx.send(());
    });

    Ok(rx)
}
