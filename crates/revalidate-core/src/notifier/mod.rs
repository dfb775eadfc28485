//! Revalidation notifier
//!
//! Turns one [`RevalidationRequest`] into at most one outbound HTTP call and
//! classifies what happened.
//!
//! ## Outcomes
//!
//! ```text
//!                 ┌───────────────┐
//!  request ──────▶│   Notifier    │
//!                 └───────────────┘
//!                         │
//!        config missing ──┼──▶ Skipped          (debug log, no call)
//!                         │
//!                         ▼ one POST
//!         ┌───────────────┼────────────────┐
//!         ▼               ▼                ▼
//!  TransportFailed    Succeeded         Rejected
//!  (no status)        (2xx)             (any other status)
//! ```
//!
//! Every outcome is terminal. There is no retry and nothing is returned to
//! the content operation that triggered the request.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{EngineEvent, emit_event};
use crate::error::Error;
use crate::event::RevalidationRequest;
use crate::traits::{ConfigProvider, OutboundRequest, RevalidationTransport, TransportResponse};

/// Classified result of one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Endpoint or secret not configured, no call attempted
    Skipped,
    /// The front-end answered with a 2xx status
    Succeeded { status: u16 },
    /// The front-end answered with any other status
    Rejected { status: u16 },
    /// The request never completed
    TransportFailed { message: String },
}

impl NotifyOutcome {
    /// Whether an HTTP call was attempted
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::Skipped)
    }

    /// Whether the front-end acknowledged the request
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Classify the result of a single transport call
///
/// A completed exchange is classified by its status code alone. Anything
/// else is a transport failure carrying the error text.
pub fn classify(result: Result<TransportResponse, Error>) -> NotifyOutcome {
    match result {
        Ok(response) if response.is_success() => NotifyOutcome::Succeeded {
            status: response.status,
        },
        Ok(response) => NotifyOutcome::Rejected {
            status: response.status,
        },
        Err(Error::Transport(message)) => NotifyOutcome::TransportFailed { message },
        Err(e) => NotifyOutcome::TransportFailed {
            message: e.to_string(),
        },
    }
}

/// Stateless notifier
///
/// Every call reads the configuration afresh and makes a fresh attempt.
/// Concurrent calls share nothing mutable.
pub struct Notifier {
    /// Read-only source of endpoint URL and secret
    config: Box<dyn ConfigProvider>,

    /// Single-shot HTTP transport
    transport: Box<dyn RevalidationTransport>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Notifier {
    /// Create a new notifier
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration provider
    /// - `transport`: Transport implementation
    /// - `event_tx`: Channel receiving one event per outcome
    pub fn new(
        config: Box<dyn ConfigProvider>,
        transport: Box<dyn RevalidationTransport>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            config,
            transport,
            event_tx,
        }
    }

    /// Notify the front-end about one request
    ///
    /// Never fails: every failure is classified, logged and emitted.
    pub async fn notify(&self, request: &RevalidationRequest) -> NotifyOutcome {
        let options = match self.config.site_options().await {
            Ok(options) => options,
            Err(e) => {
                warn!(
                    "Could not read site options from {} provider, skipping {}: {}",
                    self.config.provider_name(),
                    request,
                    e
                );
                return self.skip(request, e.to_string());
            }
        };

        let endpoint = match options.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                debug!("Not revalidating {}: {}", request, e);
                return self.skip(request, e.to_string());
            }
        };

        let outbound = match OutboundRequest::new(&endpoint, request) {
            Ok(outbound) => outbound,
            Err(e) => {
                let outcome = NotifyOutcome::TransportFailed {
                    message: e.to_string(),
                };
                self.report(request, &outcome, 0);
                return outcome;
            }
        };

        info!("Revalidating {}", request);

        let sent_at = Utc::now();
        emit_event(
            &self.event_tx,
            EngineEvent::Sent {
                request: request.clone(),
                url: outbound.url().to_string(),
                sent_at,
            },
        );

        let outcome = classify(self.transport.post(&outbound).await);
        let elapsed_ms = Utc::now().signed_duration_since(sent_at).num_milliseconds();

        self.report(request, &outcome, elapsed_ms);
        outcome
    }

    fn skip(&self, request: &RevalidationRequest, reason: String) -> NotifyOutcome {
        emit_event(
            &self.event_tx,
            EngineEvent::Skipped {
                request: request.clone(),
                reason,
            },
        );
        NotifyOutcome::Skipped
    }

    fn report(&self, request: &RevalidationRequest, outcome: &NotifyOutcome, elapsed_ms: i64) {
        let event = match outcome {
            NotifyOutcome::Skipped => return,
            NotifyOutcome::Succeeded { status } => {
                info!("Revalidation successful for {}", request);
                EngineEvent::Succeeded {
                    request: request.clone(),
                    status: *status,
                    elapsed_ms,
                }
            }
            NotifyOutcome::Rejected { status } => {
                error!(
                    "Revalidation failed for {}: {}",
                    request,
                    Error::remote_rejection(*status)
                );
                EngineEvent::Rejected {
                    request: request.clone(),
                    status: *status,
                    elapsed_ms,
                }
            }
            NotifyOutcome::TransportFailed { message } => {
                error!(
                    "Revalidation failed for {} via {}: {}",
                    request,
                    self.transport.transport_name(),
                    message
                );
                EngineEvent::TransportFailed {
                    request: request.clone(),
                    message: message.clone(),
                    elapsed_ms,
                }
            }
        };

        emit_event(&self.event_tx, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_success_range() {
        assert_eq!(
            classify(Ok(TransportResponse::new(200))),
            NotifyOutcome::Succeeded { status: 200 }
        );
        assert_eq!(
            classify(Ok(TransportResponse::new(204))),
            NotifyOutcome::Succeeded { status: 204 }
        );
    }

    #[test]
    fn classify_other_statuses_as_rejections() {
        for status in [301, 400, 401, 404, 500, 503] {
            assert_eq!(
                classify(Ok(TransportResponse::new(status))),
                NotifyOutcome::Rejected { status }
            );
        }
    }

    #[test]
    fn classify_transport_errors_keep_message() {
        assert_eq!(
            classify(Err(Error::transport("connection refused"))),
            NotifyOutcome::TransportFailed {
                message: "connection refused".to_string()
            }
        );
    }

    #[test]
    fn skipped_is_not_an_attempt() {
        assert!(!NotifyOutcome::Skipped.was_attempted());
        assert!(NotifyOutcome::Rejected { status: 503 }.was_attempted());
        assert!(!NotifyOutcome::Rejected { status: 503 }.is_success());
    }
}
