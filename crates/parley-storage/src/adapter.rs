// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use parley_config::model::StorageConfig;
use parley_core::types::{
    NewPost, NewPrivateTopic, Post, PrivateTopic, QueueEntry, ReadState, ReadStateUpdate,
};
use parley_core::{
    AdapterType, HealthStatus, JobQueue, ParleyError, PluginAdapter, PostId, PrivateTopicId,
    ReadStateStore, StorageAdapter, TopicStore, TouchOutcome, UserId, WritePolicy,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let path = self.config.database_path.clone();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ParleyError::Storage {
                    source: Box::new(e),
                })?;
            }
        }
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ParleyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl TopicStore for SqliteStorage {
    async fn create_topic(&self, topic: &NewPrivateTopic) -> Result<PrivateTopic, ParleyError> {
        queries::topics::create_topic(self.db()?, topic).await
    }

    async fn get_topic(&self, id: PrivateTopicId) -> Result<Option<PrivateTopic>, ParleyError> {
        queries::topics::get_topic(self.db()?, id).await
    }

    async fn update_topic_title(
        &self,
        id: PrivateTopicId,
        title: &str,
    ) -> Result<PrivateTopic, ParleyError> {
        queries::topics::update_topic_title(self.db()?, id, title)
            .await?
            .ok_or_else(|| ParleyError::not_found("private topic", id))
    }

    async fn list_topics_for_user(
        &self,
        user_id: UserId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PrivateTopic>, ParleyError> {
        queries::topics::list_topics_for_user(self.db()?, user_id, limit, offset).await
    }

    async fn count_topics_for_user(&self, user_id: UserId) -> Result<u64, ParleyError> {
        queries::topics::count_topics_for_user(self.db()?, user_id).await
    }

    async fn participants(&self, id: PrivateTopicId) -> Result<Vec<UserId>, ParleyError> {
        queries::topics::participants(self.db()?, id).await
    }

    async fn is_participant(
        &self,
        id: PrivateTopicId,
        user_id: UserId,
    ) -> Result<bool, ParleyError> {
        queries::topics::is_participant(self.db()?, id, user_id).await
    }

    async fn append_post(&self, post: &NewPost) -> Result<Post, ParleyError> {
        queries::posts::append_post(self.db()?, post)
            .await?
            .ok_or_else(|| ParleyError::not_found("private topic", post.private_topic_id))
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, ParleyError> {
        queries::posts::get_post(self.db()?, id).await
    }

    async fn list_posts(
        &self,
        id: PrivateTopicId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Post>, ParleyError> {
        queries::posts::list_posts(self.db()?, id, limit, offset).await
    }
}

#[async_trait]
impl ReadStateStore for SqliteStorage {
    async fn upsert_read_state(
        &self,
        update: &ReadStateUpdate,
        policy: WritePolicy,
    ) -> Result<TouchOutcome, ParleyError> {
        queries::read_states::upsert_read_state(self.db()?, update, policy).await
    }

    async fn read_state(
        &self,
        user_id: UserId,
        topic_id: PrivateTopicId,
    ) -> Result<Option<ReadState>, ParleyError> {
        queries::read_states::get_read_state(self.db()?, user_id, topic_id).await
    }

    async fn read_states_for(
        &self,
        user_id: UserId,
        topic_ids: &[PrivateTopicId],
    ) -> Result<Vec<ReadState>, ParleyError> {
        queries::read_states::read_states_for(self.db()?, user_id, topic_ids).await
    }
}

#[async_trait]
impl JobQueue for SqliteStorage {
    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        max_attempts: i32,
    ) -> Result<i64, ParleyError> {
        queries::queue::enqueue(self.db()?, queue_name, payload, max_attempts).await
    }

    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, ParleyError> {
        queries::queue::dequeue(self.db()?, queue_name).await
    }

    async fn ack(&self, id: i64) -> Result<(), ParleyError> {
        queries::queue::ack(self.db()?, id).await
    }

    async fn fail(&self, id: i64) -> Result<(), ParleyError> {
        queries::queue::fail(self.db()?, id).await
    }

    async fn purge_completed(&self, queue_name: &str) -> Result<usize, ParleyError> {
        queries::queue::purge_completed(self.db()?, queue_name).await
    }
}
