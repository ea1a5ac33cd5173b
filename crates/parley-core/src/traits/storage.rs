// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    NewPost, NewPrivateTopic, Post, PostId, PrivateTopic, PrivateTopicId, QueueEntry, ReadState,
    ReadStateUpdate, TouchOutcome, UserId, WritePolicy,
};

/// Lifecycle of a storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;
}

/// Private topics, their participants and their append-only posts.
#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Creates a topic, its participant rows and its first post atomically.
    async fn create_topic(&self, topic: &NewPrivateTopic) -> Result<PrivateTopic, ParleyError>;

    async fn get_topic(&self, id: PrivateTopicId) -> Result<Option<PrivateTopic>, ParleyError>;

    /// Replaces the title and bumps `updated_at`.
    async fn update_topic_title(
        &self,
        id: PrivateTopicId,
        title: &str,
    ) -> Result<PrivateTopic, ParleyError>;

    /// Topics `user_id` participates in, most recent activity first.
    async fn list_topics_for_user(
        &self,
        user_id: UserId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PrivateTopic>, ParleyError>;

    async fn count_topics_for_user(&self, user_id: UserId) -> Result<u64, ParleyError>;

    async fn participants(&self, id: PrivateTopicId) -> Result<Vec<UserId>, ParleyError>;

    async fn is_participant(
        &self,
        id: PrivateTopicId,
        user_id: UserId,
    ) -> Result<bool, ParleyError>;

    /// Appends a post at the next position and bumps the topic's activity.
    async fn append_post(&self, post: &NewPost) -> Result<Post, ParleyError>;

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, ParleyError>;

    /// One page of posts, oldest first.
    async fn list_posts(
        &self,
        id: PrivateTopicId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Post>, ParleyError>;
}

/// Persistence of per (user, topic) read states.
#[async_trait]
pub trait ReadStateStore: Send + Sync {
    /// Atomically inserts or updates the read state for the update's pair.
    ///
    /// Under [`WritePolicy::Monotonic`] an existing row is only replaced when
    /// the new post's position is strictly greater. Fails with
    /// [`ParleyError::NotFound`] when the post does not exist in the topic.
    async fn upsert_read_state(
        &self,
        update: &ReadStateUpdate,
        policy: WritePolicy,
    ) -> Result<TouchOutcome, ParleyError>;

    async fn read_state(
        &self,
        user_id: UserId,
        topic_id: PrivateTopicId,
    ) -> Result<Option<ReadState>, ParleyError>;

    /// Fetches the states of `user_id` for every listed topic in one round trip.
    /// Topics the user never read are absent from the result.
    async fn read_states_for(
        &self,
        user_id: UserId,
        topic_ids: &[PrivateTopicId],
    ) -> Result<Vec<ReadState>, ParleyError>;
}

/// Crash-safe background job queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a payload and returns its entry id.
    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        max_attempts: i32,
    ) -> Result<i64, ParleyError>;

    /// Claims the oldest pending entry, if any.
    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, ParleyError>;

    async fn ack(&self, id: i64) -> Result<(), ParleyError>;

    /// Records a failed attempt; the entry is retried until `max_attempts`.
    async fn fail(&self, id: i64) -> Result<(), ParleyError>;

    /// Deletes the completed entries of `queue_name`, returning how many.
    /// Failed entries are kept for inspection.
    async fn purge_completed(&self, queue_name: &str) -> Result<usize, ParleyError>;
}
