// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Parley services.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Identifier of a forum user. Authentication happens outside Parley.
    UserId
);
id_type!(
    /// Identifier of a private topic (a multi-party conversation).
    PrivateTopicId
);
id_type!(
    /// Identifier of a post within a private topic.
    PostId
);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Authorizer,
    Notifier,
}

/// A private conversation between two or more participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateTopic {
    pub id: PrivateTopicId,
    pub title: String,
    /// The user who started the topic.
    pub user_id: UserId,
    /// Author of the most recent post.
    pub last_user_id: UserId,
    /// Position of the most recent post, 0 when the topic has no posts.
    pub last_post_position: i64,
    pub posts_count: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Last activity timestamp, bumped whenever a post is appended.
    pub last_post_at: String,
}

/// Input for creating a private topic together with its first post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrivateTopic {
    pub title: String,
    pub user_id: UserId,
    /// All participants, including the author.
    pub participant_ids: Vec<UserId>,
    pub content: String,
    pub ip: Option<String>,
}

/// A single immutable post. Positions start at 1 and increase by one per post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub private_topic_id: PrivateTopicId,
    pub position: i64,
    pub user_id: UserId,
    pub content: String,
    pub ip: Option<String>,
    pub created_at: String,
}

/// Input for appending a post to an existing topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub private_topic_id: PrivateTopicId,
    pub user_id: UserId,
    pub content: String,
    pub ip: Option<String>,
}

/// How far a user has read in a private topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadState {
    pub user_id: UserId,
    pub private_topic_id: PrivateTopicId,
    pub read_post_id: PostId,
    /// Position of `read_post_id`, stored alongside it so the write guard
    /// and unread checks never have to join against posts.
    pub read_post_position: i64,
    /// 1-based page the user was viewing.
    pub page: u32,
    pub read_at: String,
}

/// A request to record that `user_id` has seen `post_id` on `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStateUpdate {
    pub user_id: UserId,
    pub private_topic_id: PrivateTopicId,
    pub post_id: PostId,
    pub page: u32,
}

/// Conflict rule applied when a read state row already exists.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WritePolicy {
    /// Only move forward: a touch at or before the stored position is dropped.
    #[default]
    Monotonic,
    /// Every touch overwrites the stored state.
    LastWriteWins,
}

/// What a read state upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TouchOutcome {
    /// No row existed; one was inserted.
    Created,
    /// The existing row moved to a later post.
    Advanced,
    /// Under [`WritePolicy::LastWriteWins`], the existing row was overwritten
    /// with a post at or before the stored one.
    Rewritten,
    /// The existing row was kept because it was already at or past the post.
    Unchanged,
}

/// Per (user, topic) read progress.
///
/// `NeverRead` moves to `ReadUpTo`, and `ReadUpTo` only moves to a strictly
/// greater position under [`WritePolicy::Monotonic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadProgress {
    NeverRead,
    ReadUpTo { position: i64, page: u32 },
}

impl ReadProgress {
    pub fn from_state(state: Option<&ReadState>) -> Self {
        match state {
            Some(s) => Self::ReadUpTo {
                position: s.read_post_position,
                page: s.page,
            },
            None => Self::NeverRead,
        }
    }

    /// Position of the last read post, 0 when nothing was read.
    pub fn position(&self) -> i64 {
        match self {
            Self::NeverRead => 0,
            Self::ReadUpTo { position, .. } => *position,
        }
    }

    /// The page to resume on, 1 when nothing was read.
    pub fn page(&self) -> u32 {
        match self {
            Self::NeverRead => 1,
            Self::ReadUpTo { page, .. } => *page,
        }
    }

    /// Whether a topic whose newest post sits at `latest_position` has
    /// anything this progress has not covered.
    pub fn is_unread(&self, latest_position: i64) -> bool {
        latest_position > self.position()
    }
}

/// A persisted background job awaiting processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}
