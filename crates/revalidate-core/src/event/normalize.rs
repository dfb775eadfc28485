//! Event normalization
//!
//! Decides, for each lifecycle event, whether the front-end must hear about
//! it and produces exactly one request when it must. No deduplication
//! across events happens here: a save followed by a status transition for
//! the same post yields two requests.

use tracing::debug;

use super::{ATTACHMENT_CONTENT_TYPE, AUTHOR_CONTENT_TYPE, LifecycleEvent, RevalidationRequest};
use crate::traits::ContentResolver;

/// Why an event produced no request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The post is a revision or autosave
    TransientSnapshot,
    /// A status transition to the same status
    StatusUnchanged,
    /// A save that created the post rather than updating it
    NotAnUpdate,
    /// The referenced post or term no longer exists
    Unresolvable,
    /// The lookup for the referenced post or term failed
    LookupFailed(String),
}

/// Result of normalizing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// Notify the front-end with this request
    Fire(RevalidationRequest),
    /// Nothing to do
    Ignore(IgnoreReason),
}

impl Normalization {
    /// Consume into the request to send, if any
    pub fn into_request(self) -> Option<RevalidationRequest> {
        match self {
            Self::Fire(request) => Some(request),
            Self::Ignore(_) => None,
        }
    }
}

/// Map a lifecycle event to at most one revalidation request
///
/// Lookups go through `resolver` for trash/untrash/delete and term events.
/// Both "not found" and lookup errors are silent skips, never errors.
pub async fn normalize(event: &LifecycleEvent, resolver: &dyn ContentResolver) -> Normalization {
    match event {
        LifecycleEvent::StatusChange {
            new_status,
            old_status,
            post,
        } => {
            if post.is_transient() {
                return Normalization::Ignore(IgnoreReason::TransientSnapshot);
            }
            if new_status == old_status {
                return Normalization::Ignore(IgnoreReason::StatusUnchanged);
            }
            Normalization::Fire(RevalidationRequest::new(post.post_type.clone(), post.id))
        }

        LifecycleEvent::Save {
            post_id,
            post,
            is_update,
        } => {
            if post.is_transient() {
                return Normalization::Ignore(IgnoreReason::TransientSnapshot);
            }
            if !is_update {
                return Normalization::Ignore(IgnoreReason::NotAnUpdate);
            }
            Normalization::Fire(RevalidationRequest::new(post.post_type.clone(), *post_id))
        }

        LifecycleEvent::Trash { post_id }
        | LifecycleEvent::Untrash { post_id }
        | LifecycleEvent::Delete { post_id } => match resolver.resolve_post(*post_id).await {
            Ok(Some(post)) => Normalization::Fire(RevalidationRequest::new(post.post_type, *post_id)),
            Ok(None) => {
                debug!("Post {} could not be resolved, skipping", post_id);
                Normalization::Ignore(IgnoreReason::Unresolvable)
            }
            Err(e) => {
                debug!("Lookup for post {} failed, skipping: {}", post_id, e);
                Normalization::Ignore(IgnoreReason::LookupFailed(e.to_string()))
            }
        },

        LifecycleEvent::TermChange {
            term_id, taxonomy, ..
        } => match resolver.resolve_term(*term_id, taxonomy).await {
            Ok(Some(_)) => Normalization::Fire(RevalidationRequest::new(taxonomy.clone(), *term_id)),
            Ok(None) => {
                debug!("Term {} in {} could not be resolved, skipping", term_id, taxonomy);
                Normalization::Ignore(IgnoreReason::Unresolvable)
            }
            Err(e) => {
                debug!("Lookup for term {} in {} failed, skipping: {}", term_id, taxonomy, e);
                Normalization::Ignore(IgnoreReason::LookupFailed(e.to_string()))
            }
        },

        LifecycleEvent::UserChange { user_id, .. } => {
            Normalization::Fire(RevalidationRequest::new(AUTHOR_CONTENT_TYPE, *user_id))
        }

        LifecycleEvent::MediaChange { attachment_id, .. } => {
            Normalization::Fire(RevalidationRequest::new(ATTACHMENT_CONTENT_TYPE, *attachment_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;
    use crate::event::{MediaAction, PostSnapshot, TermAction, UserAction};
    use crate::traits::{PostRef, TermRef};

    fn status_change(new: &str, old: &str, post: PostSnapshot) -> LifecycleEvent {
        LifecycleEvent::StatusChange {
            new_status: new.to_string(),
            old_status: old.to_string(),
            post,
        }
    }

    #[tokio::test]
    async fn status_change_fires_on_transition() {
        let store = MemoryContentStore::new();
        let event = status_change("publish", "draft", PostSnapshot::new(10, "page"));

        assert_eq!(
            normalize(&event, &store).await,
            Normalization::Fire(RevalidationRequest::new("page", 10))
        );
    }

    #[tokio::test]
    async fn status_change_to_same_status_is_ignored() {
        let store = MemoryContentStore::new();
        let event = status_change("publish", "publish", PostSnapshot::new(10, "post"));

        assert_eq!(
            normalize(&event, &store).await,
            Normalization::Ignore(IgnoreReason::StatusUnchanged)
        );
    }

    #[tokio::test]
    async fn transient_snapshots_never_fire() {
        let store = MemoryContentStore::new();
        let events = [
            status_change("publish", "draft", PostSnapshot::new(10, "post").revision()),
            status_change("publish", "draft", PostSnapshot::new(10, "post").autosave()),
            LifecycleEvent::Save {
                post_id: 10,
                post: PostSnapshot::new(10, "post").revision(),
                is_update: true,
            },
            LifecycleEvent::Save {
                post_id: 10,
                post: PostSnapshot::new(10, "post").autosave(),
                is_update: true,
            },
        ];

        for event in &events {
            assert_eq!(
                normalize(event, &store).await,
                Normalization::Ignore(IgnoreReason::TransientSnapshot),
                "{:?}",
                event
            );
        }
    }

    #[tokio::test]
    async fn save_fires_only_for_updates() {
        let store = MemoryContentStore::new();
        let created = LifecycleEvent::Save {
            post_id: 5,
            post: PostSnapshot::new(5, "post"),
            is_update: false,
        };
        let updated = LifecycleEvent::Save {
            post_id: 5,
            post: PostSnapshot::new(5, "post"),
            is_update: true,
        };

        assert_eq!(
            normalize(&created, &store).await,
            Normalization::Ignore(IgnoreReason::NotAnUpdate)
        );
        assert_eq!(
            normalize(&updated, &store).await.into_request(),
            Some(RevalidationRequest::new("post", 5))
        );
    }

    #[tokio::test]
    async fn trash_family_uses_resolved_type() {
        let store = MemoryContentStore::new();
        store.insert_post(PostRef::new(42, "product")).unwrap();

        for event in [
            LifecycleEvent::Trash { post_id: 42 },
            LifecycleEvent::Untrash { post_id: 42 },
            LifecycleEvent::Delete { post_id: 42 },
        ] {
            assert_eq!(
                normalize(&event, &store).await.into_request(),
                Some(RevalidationRequest::new("product", 42))
            );
        }
    }

    #[tokio::test]
    async fn trash_of_unknown_post_is_skipped() {
        let store = MemoryContentStore::new();
        let result = normalize(&LifecycleEvent::Trash { post_id: 99 }, &store).await;
        assert_eq!(result, Normalization::Ignore(IgnoreReason::Unresolvable));
    }

    #[tokio::test]
    async fn term_change_requires_resolvable_term() {
        let store = MemoryContentStore::new();
        store.insert_term(TermRef::new(3, "category")).unwrap();

        let known = LifecycleEvent::TermChange {
            action: TermAction::Edited,
            term_id: 3,
            term_taxonomy_id: 30,
            taxonomy: "category".to_string(),
        };
        let wrong_taxonomy = LifecycleEvent::TermChange {
            action: TermAction::Edited,
            term_id: 3,
            term_taxonomy_id: 30,
            taxonomy: "post_tag".to_string(),
        };

        assert_eq!(
            normalize(&known, &store).await.into_request(),
            Some(RevalidationRequest::new("category", 3))
        );
        assert_eq!(
            normalize(&wrong_taxonomy, &store).await,
            Normalization::Ignore(IgnoreReason::Unresolvable)
        );
    }

    #[tokio::test]
    async fn users_and_media_always_fire_with_fixed_types() {
        let store = MemoryContentStore::new();

        for action in [UserAction::Registered, UserAction::Updated, UserAction::Deleted] {
            let event = LifecycleEvent::UserChange { action, user_id: 7 };
            assert_eq!(
                normalize(&event, &store).await.into_request(),
                Some(RevalidationRequest::new("author", 7))
            );
        }

        for action in [MediaAction::Added, MediaAction::Edited, MediaAction::Deleted] {
            let event = LifecycleEvent::MediaChange {
                action,
                attachment_id: 11,
            };
            assert_eq!(
                normalize(&event, &store).await.into_request(),
                Some(RevalidationRequest::new("attachment", 11))
            );
        }
    }
}
