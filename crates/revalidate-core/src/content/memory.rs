// # Memory Content Store
//
// In-memory implementation of ContentResolver.
//
// ## Purpose
//
// Hosts that push content snapshots instead of answering lookups (the
// `revalidated` bridge, tests) register posts and terms here. A trash or
// term event then resolves exactly when a snapshot was registered.
//
// ## Locking
//
// Writes happen from synchronous code (stream adapters in the bridge), so
// the index sits behind a std `RwLock`. Guards are never held across an
// await point.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::Error;
use crate::traits::content_resolver::{ContentResolver, PostRef, TermRef};

#[derive(Debug, Default)]
struct ContentIndex {
    posts: HashMap<u64, PostRef>,
    terms: HashMap<(String, u64), TermRef>,
}

/// In-memory content index
///
/// Cloning is cheap and clones share the same index.
///
/// # Example
///
/// ```rust,no_run
/// use revalidate_core::content::MemoryContentStore;
/// use revalidate_core::traits::{ContentResolver, PostRef};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryContentStore::new();
///     store.insert_post(PostRef::new(42, "post"))?;
///
///     let post = store.resolve_post(42).await?;
///     assert_eq!(post.map(|p| p.post_type), Some("post".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<ContentIndex>>,
}

impl MemoryContentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a post
    pub fn insert_post(&self, post: PostRef) -> Result<(), Error> {
        let mut guard = self.write()?;
        guard.posts.insert(post.id, post);
        Ok(())
    }

    /// Forget a post
    pub fn remove_post(&self, post_id: u64) -> Result<Option<PostRef>, Error> {
        let mut guard = self.write()?;
        Ok(guard.posts.remove(&post_id))
    }

    /// Register or replace a term
    pub fn insert_term(&self, term: TermRef) -> Result<(), Error> {
        let mut guard = self.write()?;
        guard.terms.insert((term.taxonomy.clone(), term.id), term);
        Ok(())
    }

    /// Forget a term
    pub fn remove_term(&self, term_id: u64, taxonomy: &str) -> Result<Option<TermRef>, Error> {
        let mut guard = self.write()?;
        Ok(guard.terms.remove(&(taxonomy.to_string(), term_id)))
    }

    /// Number of registered posts and terms
    pub fn len(&self) -> Result<usize, Error> {
        let guard = self.read()?;
        Ok(guard.posts.len() + guard.terms.len())
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, ContentIndex>, Error> {
        self.inner
            .read()
            .map_err(|_| Error::content_lookup("content index lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ContentIndex>, Error> {
        self.inner
            .write()
            .map_err(|_| Error::content_lookup("content index lock poisoned"))
    }
}

#[async_trait]
impl ContentResolver for MemoryContentStore {
    async fn resolve_post(&self, post_id: u64) -> Result<Option<PostRef>, Error> {
        let guard = self.read()?;
        Ok(guard.posts.get(&post_id).cloned())
    }

    async fn resolve_term(&self, term_id: u64, taxonomy: &str) -> Result<Option<TermRef>, Error> {
        let guard = self.read()?;
        Ok(guard.terms.get(&(taxonomy.to_string(), term_id)).cloned())
    }
}
