// # Content Resolver Trait
//
// Lookups into the host content-management system. The normalizer uses
// these to decide whether trash/untrash/delete and term events still
// refer to something that exists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A post the host could resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    /// Post identifier
    pub id: u64,
    /// Post type tag (e.g. "post", "page", "product")
    pub post_type: String,
}

impl PostRef {
    /// Create a new post reference
    pub fn new(id: u64, post_type: impl Into<String>) -> Self {
        Self {
            id,
            post_type: post_type.into(),
        }
    }
}

/// A taxonomy term the host could resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    /// Term identifier
    pub id: u64,
    /// Taxonomy name (e.g. "category", "post_tag")
    pub taxonomy: String,
}

impl TermRef {
    /// Create a new term reference
    pub fn new(id: u64, taxonomy: impl Into<String>) -> Self {
        Self {
            id,
            taxonomy: taxonomy.into(),
        }
    }
}

/// Trait for content resolver implementations
///
/// # Not Found vs. Failure
///
/// `Ok(None)` means the content does not exist (anymore). `Err` means the
/// lookup itself failed. The normalizer skips silently in both cases; the
/// distinction only shows up in debug logs and engine events.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Resolve a post by identifier
    async fn resolve_post(&self, post_id: u64) -> Result<Option<PostRef>, crate::Error>;

    /// Resolve a term by identifier within a taxonomy
    async fn resolve_term(
        &self,
        term_id: u64,
        taxonomy: &str,
    ) -> Result<Option<TermRef>, crate::Error>;
}
