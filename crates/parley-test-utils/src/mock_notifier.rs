// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that captures deliveries instead of sending them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::types::PrivateTopic;
use parley_core::{
    AdapterType, HealthStatus, Notifier, ParleyError, PluginAdapter, PrivateTopicId, UserId,
};

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic_id: PrivateTopicId,
    pub title: String,
    pub recipients: Vec<UserId>,
}

/// Records every delivery; can be told to fail the next N calls.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    failures_left: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` deliveries with an internal error.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_private_topic_users(
        &self,
        topic: &PrivateTopic,
        recipients: &[UserId],
    ) -> Result<(), ParleyError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ParleyError::Internal("notifier unavailable".to_string()));
        }
        self.deliveries.lock().await.push(Delivery {
            topic_id: topic.id,
            title: topic.title.clone(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
