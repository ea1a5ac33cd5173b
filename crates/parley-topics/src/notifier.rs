// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that only writes a log line per delivery.

use async_trait::async_trait;
use parley_core::types::PrivateTopic;
use parley_core::{AdapterType, HealthStatus, Notifier, ParleyError, PluginAdapter, UserId};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log"
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
impl Notifier for LogNotifier {
    async fn notify_private_topic_users(
        &self,
        topic: &PrivateTopic,
        recipients: &[UserId],
    ) -> Result<(), ParleyError> {
        for user_id in recipients {
            info!(
                topic_id = %topic.id,
                %user_id,
                title = %topic.title,
                "new private topic"
            );
        }
        Ok(())
    }
}
