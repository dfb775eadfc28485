// # Revalidation Transport Trait
//
// Defines the interface for sending one revalidation request over the wire.
//
// ## Implementations
//
// - reqwest: `revalidate-http` crate
//
// ## Usage
//
// ```rust,ignore
// use revalidate_core::traits::{OutboundRequest, RevalidationTransport};
//
// let outbound = OutboundRequest::new(&endpoint, &request)?;
// match transport.post(&outbound).await {
//     Ok(response) if response.is_success() => { /* delivered */ }
//     Ok(response) => { /* rejected with response.status */ }
//     Err(e) => { /* request never completed */ }
// }
// ```

use async_trait::async_trait;

use crate::config::{Endpoint, SECRET_HEADER};
use crate::event::RevalidationRequest;

/// A fully built outbound HTTP request
///
/// The Debug implementation never exposes the shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    url: String,
    secret: String,
    body: String,
}

impl OutboundRequest {
    /// Build the request for an endpoint
    ///
    /// The body is the JSON form of the request:
    /// `{"contentType":"post","contentId":42}`.
    pub fn new(endpoint: &Endpoint, request: &RevalidationRequest) -> Result<Self, crate::Error> {
        Ok(Self {
            url: endpoint.revalidate_url().to_string(),
            secret: endpoint.secret().to_string(),
            body: serde_json::to_string(request)?,
        })
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Headers to send, in order
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            ("Content-Type", "application/json"),
            (SECRET_HEADER, self.secret.as_str()),
        ]
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("url", &self.url)
            .field("secret", &"<REDACTED>")
            .field("body", &self.body)
            .finish()
    }
}

/// A request that completed at the HTTP level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    /// Final status code (after redirects)
    pub status: u16,
}

impl TransportResponse {
    /// Create a new response
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    /// Whether the status is in [200, 300)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for transport implementations
///
/// # Single-Shot
///
/// One call to [`post`](RevalidationTransport::post) is one HTTP attempt.
/// Transports must not retry, back off, queue, or spawn tasks. A failed
/// attempt is reported and the notifier drops it.
///
/// # Classification Boundary
///
/// Any completed HTTP exchange is `Ok`, whatever its status code. Only a
/// request that never completed (connect, DNS, TLS, timeout, redirect
/// limit) is `Err(Error::Transport)`. The notifier owns the decision of
/// what counts as success.
#[async_trait]
pub trait RevalidationTransport: Send + Sync {
    /// Send the request once
    ///
    /// # Returns
    ///
    /// - `Ok(TransportResponse)`: The exchange completed (any status)
    /// - `Err(Error::Transport)`: The exchange did not complete
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse, crate::Error>;

    /// Get the transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
