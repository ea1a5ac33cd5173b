// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires the private topics service and the notification
//! worker over a temp SQLite database, with a [`RecordingNotifier`] in place
//! of real delivery.

use std::sync::Arc;

use parley_config::model::{ParleyConfig, StorageConfig};
use parley_core::types::{NewPost, Post, PrivateTopic};
use parley_core::{
    Authorizer, ParleyError, PrivateTopicId, StorageAdapter, TopicStore, UserId, WritePolicy,
};
use parley_storage::SqliteStorage;
use parley_topics::{
    CreateOutcome, NotificationWorker, ParticipantPolicy, PrivateTopicForm, PrivateTopicParams,
    PrivateTopicsService, UserIdsParam,
};

use crate::mock_notifier::RecordingNotifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ParleyConfig,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
            authorizer: None,
        }
    }

    pub fn with_posts_per_page(mut self, per_page: u32) -> Self {
        self.config.forum.posts_per_page = per_page;
        self
    }

    pub fn with_topics_per_page(mut self, per_page: u32) -> Self {
        self.config.forum.topics_per_page = per_page;
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.config.read_state.write_policy = policy;
        self
    }

    /// Replace the default [`ParticipantPolicy`].
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ParleyError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let authorizer = match self.authorizer {
            Some(authorizer) => authorizer,
            None => Arc::new(ParticipantPolicy::new(storage.clone())) as Arc<dyn Authorizer>,
        };
        let service = PrivateTopicsService::with_store(&config, storage.clone(), authorizer);

        let notifier = Arc::new(RecordingNotifier::new());
        let worker = NotificationWorker::new(
            storage.clone(),
            storage.clone(),
            notifier.clone(),
            &config.notifications,
        );

        Ok(TestHarness {
            storage,
            service,
            worker,
            notifier,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub service: PrivateTopicsService,
    pub worker: NotificationWorker,
    /// Captures what the worker delivers.
    pub notifier: Arc<RecordingNotifier>,
    pub config: ParleyConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Start a topic from `author` to `recipients` through the service.
    pub async fn start_topic(
        &self,
        author: i64,
        recipients: &[i64],
        title: &str,
    ) -> Result<PrivateTopic, ParleyError> {
        let form = PrivateTopicForm::from_params(
            UserId(author),
            PrivateTopicParams {
                title: title.to_string(),
                content: format!("{title}: opening post"),
                user_ids: UserIdsParam::Csv(
                    recipients
                        .iter()
                        .map(i64::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
            },
            None,
        );
        match self.service.create(form).await? {
            CreateOutcome::Created(topic) => Ok(topic),
            CreateOutcome::Invalid(form) => Err(ParleyError::Invalid(form.errors().to_vec())),
        }
    }

    /// Append `count` replies from `user` and return the refreshed topic.
    pub async fn reply(
        &self,
        topic_id: PrivateTopicId,
        user: i64,
        count: usize,
    ) -> Result<(PrivateTopic, Vec<Post>), ParleyError> {
        let mut posts = Vec::with_capacity(count);
        for i in 0..count {
            posts.push(
                self.storage
                    .append_post(&NewPost {
                        private_topic_id: topic_id,
                        user_id: UserId(user),
                        content: format!("reply {i}"),
                        ip: None,
                    })
                    .await?,
            );
        }
        let topic = self
            .storage
            .get_topic(topic_id)
            .await?
            .ok_or_else(|| ParleyError::not_found("private topic", topic_id))?;
        Ok((topic, posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_authorizer::MockAuthorizer;
    use parley_core::JobQueue;
    use parley_topics::PageRequest;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let index = harness
            .service
            .index(UserId(1), PageRequest::default())
            .await
            .unwrap();
        assert!(index.topics.is_empty());
        assert_eq!(index.page.total_pages(), 1);
    }

    #[tokio::test]
    async fn start_topic_queues_notification() {
        let harness = TestHarness::builder().build().await.unwrap();
        let topic = harness.start_topic(1, &[2, 3], "hello").await.unwrap();

        assert_eq!(harness.worker.drain().await.unwrap(), 1);
        let deliveries = harness.notifier.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].topic_id, topic.id);
        assert_eq!(deliveries[0].recipients, vec![UserId(2), UserId(3)]);
    }

    #[tokio::test]
    async fn failed_delivery_is_retried() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.start_topic(1, &[2], "retry").await.unwrap();
        harness.notifier.fail_next(1);

        // First claim fails and returns the entry to pending; the second delivers.
        assert_eq!(harness.worker.drain().await.unwrap(), 2);
        assert_eq!(harness.notifier.deliveries().await.len(), 1);
    }

    #[tokio::test]
    async fn drain_purges_delivered_entries() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.start_topic(1, &[2], "first").await.unwrap();
        harness.start_topic(1, &[3], "second").await.unwrap();
        let queue = &harness.config.notifications.queue_name;

        assert_eq!(harness.worker.drain().await.unwrap(), 2);
        // Nothing completed is left behind for a later purge.
        assert_eq!(harness.storage.purge_completed(queue).await.unwrap(), 0);
        assert_eq!(harness.notifier.deliveries().await.len(), 2);
    }

    #[tokio::test]
    async fn custom_authorizer_is_used() {
        let auth = Arc::new(MockAuthorizer::with(false, true, true));
        let harness = TestHarness::builder()
            .with_authorizer(auth.clone())
            .build()
            .await
            .unwrap();
        let topic = harness.start_topic(1, &[2], "locked").await.unwrap();

        let err = harness
            .service
            .show(UserId(1), topic.id, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::Forbidden { .. }));
        assert_eq!(auth.checks(), 2);
    }

    #[tokio::test]
    async fn denied_create_saves_nothing() {
        let auth = Arc::new(MockAuthorizer::with(true, false, true));
        let harness = TestHarness::builder()
            .with_authorizer(auth)
            .build()
            .await
            .unwrap();

        let err = harness.start_topic(1, &[2], "blocked").await.unwrap_err();
        assert!(matches!(err, ParleyError::Forbidden { user_id: 1, .. }));
        assert_eq!(harness.storage.count_topics_for_user(UserId(1)).await.unwrap(), 0);
        assert_eq!(harness.worker.drain().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.start_topic(1, &[2], "only in h1").await.unwrap();
        assert_eq!(h1.storage.count_topics_for_user(UserId(1)).await.unwrap(), 1);
        assert_eq!(h2.storage.count_topics_for_user(UserId(1)).await.unwrap(), 0);
    }
}
