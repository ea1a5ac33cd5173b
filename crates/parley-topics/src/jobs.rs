// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background notification of new private topic participants.
//!
//! Creating a topic enqueues a [`NotifyPrivateTopicUsersJob`] on the
//! configured queue. A [`NotificationWorker`] claims jobs one at a time,
//! notifies every participant except the author, and acks. Failed deliveries
//! are handed back to the queue, which retries them until `max_attempts`.

use std::sync::Arc;

use parley_config::model::NotificationsConfig;
use parley_core::types::QueueEntry;
use parley_core::{JobQueue, Notifier, ParleyError, PrivateTopicId, TopicStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Queue payload for a new topic notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyPrivateTopicUsersJob {
    pub private_topic_id: PrivateTopicId,
}

impl NotifyPrivateTopicUsersJob {
    pub fn new(private_topic_id: PrivateTopicId) -> Self {
        Self { private_topic_id }
    }

    pub fn to_payload(&self) -> Result<String, ParleyError> {
        serde_json::to_string(self)
            .map_err(|e| ParleyError::Internal(format!("failed to encode job: {e}")))
    }

    pub fn from_payload(payload: &str) -> Result<Self, ParleyError> {
        serde_json::from_str(payload)
            .map_err(|e| ParleyError::Internal(format!("failed to decode job: {e}")))
    }

    /// Put the job on the configured queue and return its entry id.
    pub async fn enqueue(
        &self,
        jobs: &dyn JobQueue,
        config: &NotificationsConfig,
    ) -> Result<i64, ParleyError> {
        let payload = self.to_payload()?;
        let id = jobs
            .enqueue(&config.queue_name, &payload, config.max_attempts)
            .await?;
        debug!(
            entry_id = id,
            topic_id = %self.private_topic_id,
            queue = %config.queue_name,
            "notification job enqueued"
        );
        Ok(id)
    }
}

/// What happened to one claimed queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Recipients were notified and the entry acked.
    Delivered { recipients: usize },
    /// The topic no longer exists; the entry was acked without notifying.
    Skipped,
    /// Processing failed; the entry was handed back for retry.
    Failed,
}

/// Drains the notification queue.
pub struct NotificationWorker {
    topics: Arc<dyn TopicStore>,
    jobs: Arc<dyn JobQueue>,
    notifier: Arc<dyn Notifier>,
    queue_name: String,
}

impl NotificationWorker {
    pub fn new(
        topics: Arc<dyn TopicStore>,
        jobs: Arc<dyn JobQueue>,
        notifier: Arc<dyn Notifier>,
        config: &NotificationsConfig,
    ) -> Self {
        Self {
            topics,
            jobs,
            notifier,
            queue_name: config.queue_name.clone(),
        }
    }

    /// Process at most one entry. Returns `None` when the queue is empty.
    pub async fn run_once(&self) -> Result<Option<JobOutcome>, ParleyError> {
        let Some(entry) = self.jobs.dequeue(&self.queue_name).await? else {
            return Ok(None);
        };

        match self.deliver(&entry).await {
            Ok(outcome) => {
                self.jobs.ack(entry.id).await?;
                Ok(Some(outcome))
            }
            Err(e) => {
                warn!(
                    entry_id = entry.id,
                    attempt = entry.attempts + 1,
                    max_attempts = entry.max_attempts,
                    error = %e,
                    "notification job failed"
                );
                self.jobs.fail(entry.id).await?;
                Ok(Some(JobOutcome::Failed))
            }
        }
    }

    /// Process entries until none are claimable. Returns how many were claimed.
    pub async fn drain(&self) -> Result<usize, ParleyError> {
        let mut processed = 0;
        while self.run_once().await?.is_some() {
            processed += 1;
        }
        if processed > 0 {
            let purged = self.jobs.purge_completed(&self.queue_name).await?;
            info!(processed, purged, queue = %self.queue_name, "notification queue drained");
        }
        Ok(processed)
    }

    async fn deliver(&self, entry: &QueueEntry) -> Result<JobOutcome, ParleyError> {
        let job = NotifyPrivateTopicUsersJob::from_payload(&entry.payload)?;
        let Some(topic) = self.topics.get_topic(job.private_topic_id).await? else {
            debug!(topic_id = %job.private_topic_id, "topic gone, skipping notification");
            return Ok(JobOutcome::Skipped);
        };

        let recipients: Vec<_> = self
            .topics
            .participants(topic.id)
            .await?
            .into_iter()
            .filter(|id| *id != topic.user_id)
            .collect();
        self.notifier
            .notify_private_topic_users(&topic, &recipients)
            .await?;
        Ok(JobOutcome::Delivered {
            recipients: recipients.len(),
        })
    }
}
