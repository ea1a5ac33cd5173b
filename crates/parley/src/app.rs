// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of storage, service and worker for one CLI invocation.

use std::sync::Arc;

use parley_config::model::ParleyConfig;
use parley_core::{ParleyError, StorageAdapter};
use parley_storage::SqliteStorage;
use parley_topics::{LogNotifier, NotificationWorker, ParticipantPolicy, PrivateTopicsService};
use tracing::debug;

pub struct App {
    storage: Arc<SqliteStorage>,
    pub service: PrivateTopicsService,
    pub worker: NotificationWorker,
}

impl App {
    pub async fn open(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let policy = Arc::new(ParticipantPolicy::new(storage.clone()));
        let service = PrivateTopicsService::with_store(config, storage.clone(), policy);
        let worker = NotificationWorker::new(
            storage.clone(),
            storage.clone(),
            Arc::new(LogNotifier),
            &config.notifications,
        );
        debug!(
            forum = %config.forum.name,
            write_policy = %config.read_state.write_policy,
            "parley ready"
        );

        Ok(Self {
            storage,
            service,
            worker,
        })
    }

    pub async fn close(&self) -> Result<(), ParleyError> {
        self.storage.close().await
    }
}
