//! Core traits for the revalidation hook
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ConfigProvider`]: Read the administrator's site options
//! - [`ContentResolver`]: Look up posts and terms in the host system
//! - [`RevalidationTransport`]: Execute one outbound HTTP POST

pub mod config_provider;
pub mod content_resolver;
pub mod transport;

pub use config_provider::ConfigProvider;
pub use content_resolver::{ContentResolver, PostRef, TermRef};
pub use transport::{OutboundRequest, RevalidationTransport, TransportResponse};
