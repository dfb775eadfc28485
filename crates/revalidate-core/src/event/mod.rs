//! Lifecycle events and revalidation requests
//!
//! A [`LifecycleEvent`] is what the host content-management system reports.
//! A [`RevalidationRequest`] is what the front-end needs to hear. The
//! [`normalize`] function maps one to at most one of the other.

mod normalize;

pub use normalize::{IgnoreReason, Normalization, normalize};

use serde::{Deserialize, Serialize};

/// Content type sent for every user change
pub const AUTHOR_CONTENT_TYPE: &str = "author";

/// Content type sent for every media change
pub const ATTACHMENT_CONTENT_TYPE: &str = "attachment";

/// The canonical `(content_type, content_id)` pair to revalidate
///
/// Serializes to the wire body `{"contentType": ..., "contentId": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationRequest {
    content_type: String,
    content_id: u64,
}

impl RevalidationRequest {
    /// Create a new request
    pub fn new(content_type: impl Into<String>, content_id: u64) -> Self {
        Self {
            content_type: content_type.into(),
            content_id,
        }
    }

    /// Content type (post type, taxonomy, "author" or "attachment")
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content identifier
    pub fn content_id(&self) -> u64 {
        self.content_id
    }
}

impl std::fmt::Display for RevalidationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} with ID {}", self.content_type, self.content_id)
    }
}

/// Post data handed over with status transitions and saves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSnapshot {
    /// Post identifier
    pub id: u64,
    /// Post type tag
    pub post_type: String,
    /// The post is a revision of another post
    #[serde(default)]
    pub is_revision: bool,
    /// The post is an autosave
    #[serde(default)]
    pub is_autosave: bool,
}

impl PostSnapshot {
    /// Create a snapshot of a durable (non-transient) post
    pub fn new(id: u64, post_type: impl Into<String>) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            is_revision: false,
            is_autosave: false,
        }
    }

    /// Mark the snapshot as a revision
    pub fn revision(mut self) -> Self {
        self.is_revision = true;
        self
    }

    /// Mark the snapshot as an autosave
    pub fn autosave(mut self) -> Self {
        self.is_autosave = true;
        self
    }

    /// Revisions and autosaves never trigger external side effects
    pub fn is_transient(&self) -> bool {
        self.is_revision || self.is_autosave
    }
}

/// What happened to a taxonomy term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermAction {
    Created,
    Edited,
    Deleted,
}

/// What happened to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Registered,
    Updated,
    Deleted,
}

/// What happened to an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaAction {
    Added,
    Edited,
    Deleted,
}

/// A content-lifecycle event reported by the host system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A post moved from one status to another
    StatusChange {
        new_status: String,
        old_status: String,
        post: PostSnapshot,
    },

    /// A post was saved
    Save {
        post_id: u64,
        post: PostSnapshot,
        /// `false` when the save created the post
        is_update: bool,
    },

    /// A post was moved to the trash
    Trash { post_id: u64 },

    /// A post was restored from the trash
    Untrash { post_id: u64 },

    /// A post is being deleted permanently
    Delete { post_id: u64 },

    /// A taxonomy term was created, edited or deleted
    TermChange {
        action: TermAction,
        term_id: u64,
        term_taxonomy_id: u64,
        taxonomy: String,
    },

    /// A user was registered, updated or deleted
    UserChange { action: UserAction, user_id: u64 },

    /// An attachment was added, edited or deleted
    MediaChange {
        action: MediaAction,
        attachment_id: u64,
    },
}

impl LifecycleEvent {
    /// Name of the host trigger this event corresponds to
    pub fn trigger(&self) -> &'static str {
        match self {
            Self::StatusChange { .. } => "transition_post_status",
            Self::Save { .. } => "save_post",
            Self::Trash { .. } => "trashed_post",
            Self::Untrash { .. } => "untrashed_post",
            Self::Delete { .. } => "delete_post",
            Self::TermChange { action, .. } => match action {
                TermAction::Created => "created_term",
                TermAction::Edited => "edited_term",
                TermAction::Deleted => "delete_term",
            },
            Self::UserChange { action, .. } => match action {
                UserAction::Registered => "user_register",
                UserAction::Updated => "profile_update",
                UserAction::Deleted => "delete_user",
            },
            Self::MediaChange { action, .. } => match action {
                MediaAction::Added => "add_attachment",
                MediaAction::Edited => "edit_attachment",
                MediaAction::Deleted => "delete_attachment",
            },
        }
    }
}
