// # HTTP Revalidation Transport
//
// reqwest-backed implementation of `RevalidationTransport`.
//
// ## Behavior
//
// - One POST per call, no retry
// - Timeout applies to the whole exchange (default 5 seconds)
// - Redirects are followed up to a limit (default 5)
// - The final status code is returned as-is; classification is the
//   notifier's job
// - Any failure to complete the exchange is an `Error::Transport` carrying
//   the full error chain
//
// ## Security
//
// - The shared secret is only ever placed in the request header
// - The secret never appears in logs or Debug output
//
// ## Usage
//
// ```rust,ignore
// use revalidate_core::DeliveryConfig;
// use revalidate_http::HttpTransport;
//
// let transport = HttpTransport::new(&DeliveryConfig::default())?;
// let (engine, events) = RevalidateEngine::new(
//     Box::new(resolver),
//     Box::new(config_provider),
//     Box::new(transport),
//     RevalidateConfig::default(),
// )?;
// ```

use async_trait::async_trait;
use reqwest::redirect::Policy;
use revalidate_core::traits::{OutboundRequest, RevalidationTransport, TransportResponse};
use revalidate_core::{DeliveryConfig, Error, Result};
use std::time::Duration;

/// HTTP transport
///
/// Stateless apart from the connection pool inside the reqwest client.
/// Safe to share across concurrent notifications.
pub struct HttpTransport {
    /// HTTP client with timeout and redirect policy applied
    client: reqwest::Client,

    timeout: Duration,

    max_redirects: usize,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from delivery settings
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the settings are invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        config.validate()?;
        Self::with_limits(config.timeout(), config.max_redirects)
    }

    /// Create a transport with an explicit timeout and redirect limit
    ///
    /// Unlike [`new`](Self::new), sub-second timeouts are accepted.
    pub fn with_limits(timeout: Duration, max_redirects: usize) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::config("HTTP timeout must be greater than zero"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            max_redirects,
        })
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Configured redirect limit
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

#[async_trait]
impl RevalidationTransport for HttpTransport {
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse> {
        let mut builder = self.client.post(request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        tracing::debug!("POST {}", request.url());

        let response = builder
            .body(request.body().to_string())
            .send()
            .await
            .map_err(|e| Error::transport(describe(&e)))?;

        let status = response.status().as_u16();
        tracing::debug!("POST {} answered {}", request.url(), status);

        Ok(TransportResponse::new(status))
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}

/// Render a reqwest error together with its causes
///
/// reqwest's Display stops at the outermost layer, which hides the useful
/// part ("connection refused", "too many redirects").
fn describe(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else {
        error.to_string()
    };

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
