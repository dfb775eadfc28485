//! Revalidation engine
//!
//! The RevalidateEngine is responsible for:
//! - Exposing one named handler per host trigger
//! - Normalizing lifecycle events into revalidation requests
//! - Handing each request to the [`Notifier`]
//! - Optionally draining a queue of events off the host's critical path
//!
//! ## Architecture
//!
//! ```text
//!  host trigger ──▶ on_*() ─┐
//!                           ▼
//!  EventSender ──▶ queue ──▶ run() ──▶ handle()
//!                                         │
//!                      ┌──────────────────┼──────────────────┐
//!                      ▼                  ▼                  ▼
//!               ┌──────────────┐   ┌─────────────┐    ┌─────────────┐
//!               │ normalize()  │──▶│  Notifier   │    │   Events    │
//!               │ (resolver)   │   │ (transport) │    │  (observe)  │
//!               └──────────────┘   └─────────────┘    └─────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Host calls a named handler, or submits an event to the queue
//! 2. Normalizer filters transient, no-op and unresolvable events
//! 3. Notifier reads configuration and makes one HTTP attempt
//! 4. Outcome is logged and emitted; nothing is returned to the host

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::RevalidateConfig;
use crate::error::{Error, Result};
use crate::event::{
    IgnoreReason, LifecycleEvent, MediaAction, Normalization, PostSnapshot, RevalidationRequest,
    TermAction, UserAction, normalize,
};
use crate::notifier::Notifier;
use crate::traits::{ConfigProvider, ContentResolver, RevalidationTransport};

/// Events emitted by the RevalidateEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run loop started
    Started,

    /// Run loop stopped
    Stopped { reason: String },

    /// A lifecycle event produced no request
    Ignored {
        trigger: &'static str,
        reason: IgnoreReason,
    },

    /// A request was dropped because the endpoint is not configured
    Skipped {
        request: RevalidationRequest,
        reason: String,
    },

    /// A request is about to be sent
    Sent {
        request: RevalidationRequest,
        url: String,
        sent_at: DateTime<Utc>,
    },

    /// The front-end acknowledged a request
    Succeeded {
        request: RevalidationRequest,
        status: u16,
        elapsed_ms: i64,
    },

    /// The front-end answered with a non-2xx status
    Rejected {
        request: RevalidationRequest,
        status: u16,
        elapsed_ms: i64,
    },

    /// The request never completed
    TransportFailed {
        request: RevalidationRequest,
        message: String,
        elapsed_ms: i64,
    },
}

/// Emit an engine event
///
/// Events are for observation only; a full channel drops the event and
/// never slows down delivery.
pub(crate) fn emit_event(tx: &mpsc::Sender<EngineEvent>, event: EngineEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
        // Nobody is listening
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

/// Create a bounded queue of lifecycle events
///
/// The sender half goes to the host; the stream half goes to
/// [`RevalidateEngine::run`]. Events are handled one at a time in
/// submission order.
pub fn event_queue(capacity: usize) -> (EventSender, ReceiverStream<LifecycleEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, ReceiverStream::new(rx))
}

/// Host-side handle of an event queue
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<LifecycleEvent>,
}

impl EventSender {
    /// Queue an event without waiting
    ///
    /// # Returns
    ///
    /// `true` if queued, `false` if the queue is full or closed (the event
    /// is dropped with a warning)
    pub fn submit(&self, event: LifecycleEvent) -> bool {
        let trigger = event.trigger();
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event queue full, dropping {} event", trigger);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Event queue closed, dropping {} event", trigger);
                false
            }
        }
    }
}

/// Core revalidation engine
///
/// ## Lifecycle
///
/// 1. Create with [`RevalidateEngine::new()`]
/// 2. Either call the `on_*` handlers inline from the host, or
/// 3. Feed a stream of events to [`RevalidateEngine::run()`]
///
/// ## Failure Isolation
///
/// Handlers return `()`. A revalidation failure is logged and emitted as an
/// [`EngineEvent`], never propagated to the triggering content operation.
pub struct RevalidateEngine {
    /// Host lookups for trash/untrash/delete and term events
    resolver: Box<dyn ContentResolver>,

    /// Outbound notification
    notifier: Notifier,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl RevalidateEngine {
    /// Create a new revalidation engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: Content resolver implementation
    /// - `config_provider`: Source of endpoint URL and secret
    /// - `transport`: Transport implementation
    /// - `config`: Process settings
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: Box<dyn ContentResolver>,
        config_provider: Box<dyn ConfigProvider>,
        transport: Box<dyn RevalidationTransport>,
        config: RevalidateConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            resolver,
            notifier: Notifier::new(config_provider, transport, tx.clone()),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Normalize one event and notify if required
    pub async fn handle(&self, event: &LifecycleEvent) {
        match normalize(event, self.resolver.as_ref()).await {
            Normalization::Fire(request) => {
                self.notifier.notify(&request).await;
            }
            Normalization::Ignore(reason) => {
                debug!("Ignoring {} event: {:?}", event.trigger(), reason);
                emit_event(
                    &self.event_tx,
                    EngineEvent::Ignored {
                        trigger: event.trigger(),
                        reason,
                    },
                );
            }
        }
    }

    /// Handler for `transition_post_status(new_status, old_status, post)`
    pub async fn on_post_status_change(&self, new_status: &str, old_status: &str, post: PostSnapshot) {
        self.handle(&LifecycleEvent::StatusChange {
            new_status: new_status.to_string(),
            old_status: old_status.to_string(),
            post,
        })
        .await;
    }

    /// Handler for `save_post(post_id, post, update)`
    pub async fn on_save_post(&self, post_id: u64, post: PostSnapshot, is_update: bool) {
        self.handle(&LifecycleEvent::Save {
            post_id,
            post,
            is_update,
        })
        .await;
    }

    /// Handler for `trashed_post(post_id)`
    pub async fn on_trash_post(&self, post_id: u64) {
        self.handle(&LifecycleEvent::Trash { post_id }).await;
    }

    /// Handler for `untrashed_post(post_id)`
    pub async fn on_untrash_post(&self, post_id: u64) {
        self.handle(&LifecycleEvent::Untrash { post_id }).await;
    }

    /// Handler for `delete_post(post_id)`
    pub async fn on_delete_post(&self, post_id: u64) {
        self.handle(&LifecycleEvent::Delete { post_id }).await;
    }

    /// Handler for `created_term(term_id, tt_id, taxonomy)`
    pub async fn on_term_created(&self, term_id: u64, term_taxonomy_id: u64, taxonomy: &str) {
        self.on_term_change(TermAction::Created, term_id, term_taxonomy_id, taxonomy)
            .await;
    }

    /// Handler for `edited_term(term_id, tt_id, taxonomy)`
    pub async fn on_term_edited(&self, term_id: u64, term_taxonomy_id: u64, taxonomy: &str) {
        self.on_term_change(TermAction::Edited, term_id, term_taxonomy_id, taxonomy)
            .await;
    }

    /// Handler for `delete_term(term_id, tt_id, taxonomy)`
    pub async fn on_term_deleted(&self, term_id: u64, term_taxonomy_id: u64, taxonomy: &str) {
        self.on_term_change(TermAction::Deleted, term_id, term_taxonomy_id, taxonomy)
            .await;
    }

    async fn on_term_change(
        &self,
        action: TermAction,
        term_id: u64,
        term_taxonomy_id: u64,
        taxonomy: &str,
    ) {
        self.handle(&LifecycleEvent::TermChange {
            action,
            term_id,
            term_taxonomy_id,
            taxonomy: taxonomy.to_string(),
        })
        .await;
    }

    /// Handler for `user_register(user_id)`
    pub async fn on_user_registered(&self, user_id: u64) {
        self.on_user_change(UserAction::Registered, user_id).await;
    }

    /// Handler for `profile_update(user_id)`
    pub async fn on_user_updated(&self, user_id: u64) {
        self.on_user_change(UserAction::Updated, user_id).await;
    }

    /// Handler for `delete_user(user_id)`
    pub async fn on_user_deleted(&self, user_id: u64) {
        self.on_user_change(UserAction::Deleted, user_id).await;
    }

    async fn on_user_change(&self, action: UserAction, user_id: u64) {
        self.handle(&LifecycleEvent::UserChange { action, user_id })
            .await;
    }

    /// Handler for `add_attachment(attachment_id)`
    pub async fn on_attachment_added(&self, attachment_id: u64) {
        self.on_media_change(MediaAction::Added, attachment_id).await;
    }

    /// Handler for `edit_attachment(attachment_id)`
    pub async fn on_attachment_edited(&self, attachment_id: u64) {
        self.on_media_change(MediaAction::Edited, attachment_id).await;
    }

    /// Handler for `delete_attachment(attachment_id)`
    pub async fn on_attachment_deleted(&self, attachment_id: u64) {
        self.on_media_change(MediaAction::Deleted, attachment_id).await;
    }

    async fn on_media_change(&self, action: MediaAction, attachment_id: u64) {
        self.handle(&LifecycleEvent::MediaChange {
            action,
            attachment_id,
        })
        .await;
    }

    /// Run the engine over a stream of events
    ///
    /// Events are handled one at a time in arrival order. Returns when the
    /// stream ends or on SIGINT.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: The signal handler could not be installed
    pub async fn run<S>(&self, events: S) -> Result<()>
    where
        S: Stream<Item = LifecycleEvent> + Send,
    {
        self.run_internal(events, None).await
    }

    /// Run the engine with a controlled shutdown signal
    ///
    /// Same as [`run`](Self::run), but stops when `shutdown_rx` fires
    /// instead of on SIGINT. Passing `None` falls back to SIGINT.
    pub async fn run_with_shutdown<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = LifecycleEvent> + Send,
    {
        self.run_internal(events, shutdown_rx).await
    }

    async fn run_internal<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = LifecycleEvent> + Send,
    {
        emit_event(&self.event_tx, EngineEvent::Started);
        info!("Revalidation engine started");

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    // A dropped sender counts as a shutdown request
                    let _ = rx.await;
                    Ok(())
                }
                None => tokio::signal::ctrl_c().await.map_err(Error::from),
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(events);

        let reason = loop {
            tokio::select! {
                biased;

                signal = &mut shutdown => {
                    if let Err(e) = signal {
                        error!("Failed to wait for shutdown signal: {}", e);
                        emit_event(&self.event_tx, EngineEvent::Stopped {
                            reason: "Signal handler failed".to_string(),
                        });
                        return Err(e);
                    }
                    info!("Shutdown signal received");
                    break "Shutdown signal";
                }

                next = events.next() => match next {
                    Some(event) => self.handle(&event).await,
                    None => {
                        info!("Event stream closed");
                        break "Event stream closed";
                    }
                },
            }
        };

        emit_event(
            &self.event_tx,
            EngineEvent::Stopped {
                reason: reason.to_string(),
            },
        );
        info!("Revalidation engine stopped");

        Ok(())
    }
}
