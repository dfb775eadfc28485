// # revalidate-core
//
// Core library for the content revalidation hook.
//
// ## Architecture Overview
//
// This library turns content-lifecycle events from a content-management
// system into cache revalidation calls against a rendering front-end:
// - **LifecycleEvent**: What the host reports (status change, save, trash, term, user, media)
// - **normalize**: Filters and maps an event to at most one RevalidationRequest
// - **Notifier**: Sends one HTTP POST per request and classifies the outcome
// - **RevalidateEngine**: Named host handlers plus an ordered event loop
// - **ConfigProvider / ContentResolver / RevalidationTransport**: Collaborator seams
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from the HTTP client and the host
// 2. **Fire-and-Forget**: No revalidation failure ever reaches the content operation
// 3. **Single-Shot**: One attempt per event, no retry, no batching
// 4. **Library-First**: The bridge daemon is a thin layer over this crate
// 5. **Observable**: Every outcome is logged via tracing and emitted as an EngineEvent

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod event;
pub mod notifier;
pub mod provider;
pub mod traits;

// Re-export core types for convenience
pub use config::{DeliveryConfig, EngineConfig, Endpoint, RevalidateConfig, SiteOptions};
pub use content::MemoryContentStore;
pub use engine::{EngineEvent, EventSender, RevalidateEngine, event_queue};
pub use error::{Error, Result};
pub use event::{LifecycleEvent, Normalization, PostSnapshot, RevalidationRequest, normalize};
pub use notifier::{Notifier, NotifyOutcome};
pub use provider::{FileConfigProvider, MemoryConfigProvider};
pub use traits::{ConfigProvider, ContentResolver, RevalidationTransport};
