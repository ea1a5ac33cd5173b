// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic listing rows decorated with the viewer's read progress.

use parley_core::types::PrivateTopic;
use parley_core::{ReadProgress, UserId};
use tracing::warn;

use crate::tracker::ReadStateTracker;

/// A private topic as seen by one user in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPrivateTopicView {
    pub topic: PrivateTopic,
    /// The topic has posts past the user's read position.
    pub unread: bool,
    /// Page to open the topic on.
    pub last_read_page: u32,
}

impl UserPrivateTopicView {
    fn new(topic: PrivateTopic, progress: ReadProgress) -> Self {
        Self {
            unread: topic.last_post_position > 0 && progress.is_unread(topic.last_post_position),
            last_read_page: progress.page(),
            topic,
        }
    }

    /// Decorate a page of topics with one batched read state lookup.
    ///
    /// A failed lookup must not break the listing: every topic is then shown
    /// as unread on page 1.
    pub async fn decorate_all(
        tracker: &ReadStateTracker,
        user_id: UserId,
        topics: Vec<PrivateTopic>,
    ) -> Vec<Self> {
        let ids: Vec<_> = topics.iter().map(|t| t.id).collect();
        let progress = match tracker.progress_for_all(user_id, &ids).await {
            Ok(progress) => progress,
            Err(e) => {
                warn!(%user_id, error = %e, "read state lookup failed, showing topics as unread");
                Default::default()
            }
        };
        topics
            .into_iter()
            .map(|topic| {
                let p = progress
                    .get(&topic.id)
                    .copied()
                    .unwrap_or(ReadProgress::NeverRead);
                Self::new(topic, p)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parley_core::types::{ReadState, ReadStateUpdate};
    use parley_core::{
        ParleyError, PrivateTopicId, ReadStateStore, TouchOutcome, WritePolicy,
    };

    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl ReadStateStore for BrokenStore {
        async fn upsert_read_state(
            &self,
            _update: &ReadStateUpdate,
            _policy: WritePolicy,
        ) -> Result<TouchOutcome, ParleyError> {
            Err(ParleyError::Internal("offline".into()))
        }

        async fn read_state(
            &self,
            _user_id: UserId,
            _topic_id: PrivateTopicId,
        ) -> Result<Option<ReadState>, ParleyError> {
            Err(ParleyError::Internal("offline".into()))
        }

        async fn read_states_for(
            &self,
            _user_id: UserId,
            _topic_ids: &[PrivateTopicId],
        ) -> Result<Vec<ReadState>, ParleyError> {
            Err(ParleyError::Internal("offline".into()))
        }
    }

    fn topic(id: i64, last_post_position: i64) -> PrivateTopic {
        PrivateTopic {
            id: PrivateTopicId(id),
            title: format!("topic {id}"),
            user_id: UserId(1),
            last_user_id: UserId(1),
            last_post_position,
            posts_count: last_post_position,
            created_at: String::new(),
            updated_at: String::new(),
            last_post_at: String::new(),
        }
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_unread_on_page_one() {
        let tracker = ReadStateTracker::new(Arc::new(BrokenStore), WritePolicy::Monotonic);
        let rows =
            UserPrivateTopicView::decorate_all(&tracker, UserId(2), vec![topic(1, 4), topic(2, 0)])
                .await;

        assert_eq!(rows.len(), 2);
        assert!(rows[0].unread);
        assert_eq!(rows[0].last_read_page, 1);
        // Empty topics stay read even without progress.
        assert!(!rows[1].unread);
    }
}
