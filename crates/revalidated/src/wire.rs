// # Bridge wire format
//
// One JSON object per line, tagged by the host trigger name:
//
// ```json
// {"hook":"transition_post_status","new_status":"publish","old_status":"draft","post":{"id":12,"post_type":"page"}}
// {"hook":"save_post","post_id":12,"post":{"id":12,"post_type":"page"},"update":true}
// {"hook":"trashed_post","post_id":42,"post":{"post_type":"post"}}
// {"hook":"edited_term","term_id":5,"tt_id":50,"taxonomy":"category","term":{"name":"News"}}
// {"hook":"profile_update","user_id":{"ID":7}}
// {"hook":"add_attachment","attachment_id":9}
// ```
//
// Snapshots on trash/untrash/delete and term calls stand in for the host's
// content lookups: they are written to the content store right before the
// event is handled, and a call without one clears any earlier entry.

use revalidate_core::event::{MediaAction, TermAction, UserAction};
use revalidate_core::traits::{PostRef, TermRef};
use revalidate_core::{LifecycleEvent, MemoryContentStore, PostSnapshot, Result};
use serde::Deserialize;

/// Type information for a post that still exists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostHint {
    pub post_type: String,
}

/// A user given either as a bare id or as a user object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserIdentity {
    Id(u64),
    User {
        #[serde(rename = "ID")]
        id: u64,
    },
}

impl UserIdentity {
    pub fn id(self) -> u64 {
        match self {
            Self::Id(id) | Self::User { id } => id,
        }
    }
}

/// One host hook invocation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookCall {
    TransitionPostStatus {
        new_status: String,
        old_status: String,
        post: PostSnapshot,
    },
    SavePost {
        post_id: u64,
        post: PostSnapshot,
        update: bool,
    },
    TrashedPost {
        post_id: u64,
        #[serde(default)]
        post: Option<PostHint>,
    },
    UntrashedPost {
        post_id: u64,
        #[serde(default)]
        post: Option<PostHint>,
    },
    DeletePost {
        post_id: u64,
        #[serde(default)]
        post: Option<PostHint>,
    },
    CreatedTerm {
        term_id: u64,
        #[serde(default, alias = "term_taxonomy_id")]
        tt_id: u64,
        taxonomy: String,
        #[serde(default)]
        term: Option<serde_json::Value>,
    },
    EditedTerm {
        term_id: u64,
        #[serde(default, alias = "term_taxonomy_id")]
        tt_id: u64,
        taxonomy: String,
        #[serde(default)]
        term: Option<serde_json::Value>,
    },
    DeleteTerm {
        term_id: u64,
        #[serde(default, alias = "term_taxonomy_id")]
        tt_id: u64,
        taxonomy: String,
        #[serde(default)]
        term: Option<serde_json::Value>,
    },
    UserRegister {
        user_id: UserIdentity,
    },
    ProfileUpdate {
        user_id: UserIdentity,
    },
    DeleteUser {
        user_id: UserIdentity,
    },
    AddAttachment {
        attachment_id: u64,
    },
    EditAttachment {
        attachment_id: u64,
    },
    DeleteAttachment {
        attachment_id: u64,
    },
}

/// Parse one input line
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> serde_json::Result<Option<HookCall>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

impl HookCall {
    /// Apply any snapshot to the store and convert to a lifecycle event
    pub fn into_event(self, store: &MemoryContentStore) -> Result<LifecycleEvent> {
        let event = match self {
            Self::TransitionPostStatus {
                new_status,
                old_status,
                post,
            } => LifecycleEvent::StatusChange {
                new_status,
                old_status,
                post,
            },
            Self::SavePost {
                post_id,
                post,
                update,
            } => LifecycleEvent::Save {
                post_id,
                post,
                is_update: update,
            },
            Self::TrashedPost { post_id, post } => {
                sync_post(store, post_id, post)?;
                LifecycleEvent::Trash { post_id }
            }
            Self::UntrashedPost { post_id, post } => {
                sync_post(store, post_id, post)?;
                LifecycleEvent::Untrash { post_id }
            }
            Self::DeletePost { post_id, post } => {
                sync_post(store, post_id, post)?;
                LifecycleEvent::Delete { post_id }
            }
            Self::CreatedTerm {
                term_id,
                tt_id,
                taxonomy,
                term,
            } => term_event(store, TermAction::Created, term_id, tt_id, taxonomy, term)?,
            Self::EditedTerm {
                term_id,
                tt_id,
                taxonomy,
                term,
            } => term_event(store, TermAction::Edited, term_id, tt_id, taxonomy, term)?,
            Self::DeleteTerm {
                term_id,
                tt_id,
                taxonomy,
                term,
            } => term_event(store, TermAction::Deleted, term_id, tt_id, taxonomy, term)?,
            Self::UserRegister { user_id } => user_event(UserAction::Registered, user_id),
            Self::ProfileUpdate { user_id } => user_event(UserAction::Updated, user_id),
            Self::DeleteUser { user_id } => user_event(UserAction::Deleted, user_id),
            Self::AddAttachment { attachment_id } => media_event(MediaAction::Added, attachment_id),
            Self::EditAttachment { attachment_id } => {
                media_event(MediaAction::Edited, attachment_id)
            }
            Self::DeleteAttachment { attachment_id } => {
                media_event(MediaAction::Deleted, attachment_id)
            }
        };

        Ok(event)
    }
}

fn sync_post(store: &MemoryContentStore, post_id: u64, post: Option<PostHint>) -> Result<()> {
    match post {
        Some(hint) => store.insert_post(PostRef::new(post_id, hint.post_type)),
        None => store.remove_post(post_id).map(|_| ()),
    }
}

fn term_event(
    store: &MemoryContentStore,
    action: TermAction,
    term_id: u64,
    term_taxonomy_id: u64,
    taxonomy: String,
    term: Option<serde_json::Value>,
) -> Result<LifecycleEvent> {
    match term {
        Some(_) => store.insert_term(TermRef::new(term_id, taxonomy.clone()))?,
        None => {
            store.remove_term(term_id, &taxonomy)?;
        }
    }

    Ok(LifecycleEvent::TermChange {
        action,
        term_id,
        term_taxonomy_id,
        taxonomy,
    })
}

fn user_event(action: UserAction, user_id: UserIdentity) -> LifecycleEvent {
    LifecycleEvent::UserChange {
        action,
        user_id: user_id.id(),
    }
}

fn media_event(action: MediaAction, attachment_id: u64) -> LifecycleEvent {
    LifecycleEvent::MediaChange {
        action,
        attachment_id,
    }
}
