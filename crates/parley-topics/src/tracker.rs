// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per (user, topic) read progress.
//!
//! The tracker records how far each participant has read and answers unread
//! queries from the stored position alone, without scanning posts. Writes go
//! through [`ReadStateStore::upsert_read_state`], which applies the configured
//! [`WritePolicy`] atomically per row.
//!
//! Callers are expected to have authorized the user for the topic already.

use std::collections::HashMap;
use std::sync::Arc;

use parley_core::types::{Post, PrivateTopic, ReadStateUpdate};
use parley_core::{
    ParleyError, PrivateTopicId, ReadProgress, ReadStateStore, TouchOutcome, UserId, WritePolicy,
};
use tracing::debug;

/// Records and queries read progress.
pub struct ReadStateTracker {
    store: Arc<dyn ReadStateStore>,
    policy: WritePolicy,
}

impl ReadStateTracker {
    pub fn new(store: Arc<dyn ReadStateStore>, policy: WritePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Record that `user_id` has seen `last_visible` while viewing `page`.
    ///
    /// Returns `Ok(None)` without touching storage when the page had no
    /// posts. A missing topic is `NotFound("private topic")`; otherwise a post
    /// that is not part of the topic is `NotFound("post")`.
    pub async fn touch(
        &self,
        user_id: UserId,
        topic_id: PrivateTopicId,
        last_visible: Option<&Post>,
        page: u32,
    ) -> Result<Option<TouchOutcome>, ParleyError> {
        let Some(post) = last_visible else {
            debug!(%user_id, %topic_id, page, "touch skipped: page has no posts");
            return Ok(None);
        };

        let update = ReadStateUpdate {
            user_id,
            private_topic_id: topic_id,
            post_id: post.id,
            page: page.max(1),
        };
        let outcome = self.store.upsert_read_state(&update, self.policy).await?;
        debug!(
            %user_id,
            %topic_id,
            post_id = %post.id,
            position = post.position,
            page = update.page,
            %outcome,
            "read state touched"
        );
        Ok(Some(outcome))
    }

    /// The stored progress, or [`ReadProgress::NeverRead`].
    pub async fn progress_for(
        &self,
        user_id: UserId,
        topic_id: PrivateTopicId,
    ) -> Result<ReadProgress, ParleyError> {
        let state = self.store.read_state(user_id, topic_id).await?;
        Ok(ReadProgress::from_state(state.as_ref()))
    }

    /// Progress for many topics with a single store round trip.
    ///
    /// Every requested id is present in the result.
    pub async fn progress_for_all(
        &self,
        user_id: UserId,
        topic_ids: &[PrivateTopicId],
    ) -> Result<HashMap<PrivateTopicId, ReadProgress>, ParleyError> {
        let mut progress: HashMap<_, _> = topic_ids
            .iter()
            .map(|id| (*id, ReadProgress::NeverRead))
            .collect();
        if topic_ids.is_empty() {
            return Ok(progress);
        }
        for state in self.store.read_states_for(user_id, topic_ids).await? {
            progress.insert(
                state.private_topic_id,
                ReadProgress::from_state(Some(&state)),
            );
        }
        Ok(progress)
    }

    /// Whether `topic` has posts past what `user_id` has read.
    ///
    /// A topic without posts is never unread.
    pub async fn is_unread_for(
        &self,
        user_id: UserId,
        topic: &PrivateTopic,
    ) -> Result<bool, ParleyError> {
        if topic.last_post_position == 0 {
            return Ok(false);
        }
        let progress = self.progress_for(user_id, topic.id).await?;
        Ok(progress.is_unread(topic.last_post_position))
    }

    /// Batched [`is_unread_for`](Self::is_unread_for).
    pub async fn unread_for_all(
        &self,
        user_id: UserId,
        topics: &[PrivateTopic],
    ) -> Result<HashMap<PrivateTopicId, bool>, ParleyError> {
        let ids: Vec<_> = topics.iter().map(|t| t.id).collect();
        let progress = self.progress_for_all(user_id, &ids).await?;
        Ok(topics
            .iter()
            .map(|topic| {
                let unread = progress
                    .get(&topic.id)
                    .is_some_and(|p| p.is_unread(topic.last_post_position));
                (topic.id, unread)
            })
            .collect())
    }

    /// The page `user_id` was last on, 1 if they never opened the topic.
    pub async fn last_read_page_for(
        &self,
        user_id: UserId,
        topic_id: PrivateTopicId,
    ) -> Result<u32, ParleyError> {
        Ok(self.progress_for(user_id, topic_id).await?.page())
    }
}
