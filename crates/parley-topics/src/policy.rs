// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default authorizer: participants read, creators edit, anyone starts a topic.

use std::sync::Arc;

use async_trait::async_trait;
use parley_core::types::{NewPrivateTopic, PrivateTopic};
use parley_core::{
    AdapterType, Authorizer, HealthStatus, ParleyError, PluginAdapter, TopicStore, UserId,
};

pub struct ParticipantPolicy {
    topics: Arc<dyn TopicStore>,
}

impl ParticipantPolicy {
    pub fn new(topics: Arc<dyn TopicStore>) -> Self {
        Self { topics }
    }
}

#[async_trait]
impl PluginAdapter for ParticipantPolicy {
    fn name(&self) -> &str {
        "participant-policy"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Authorizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl Authorizer for ParticipantPolicy {
    async fn can_read(&self, user_id: UserId, topic: &PrivateTopic) -> Result<bool, ParleyError> {
        self.topics.is_participant(topic.id, user_id).await
    }

    async fn can_create(
        &self,
        user_id: UserId,
        topic: &NewPrivateTopic,
    ) -> Result<bool, ParleyError> {
        Ok(topic.user_id == user_id)
    }

    async fn can_update(
        &self,
        user_id: UserId,
        topic: &PrivateTopic,
    ) -> Result<bool, ParleyError> {
        Ok(topic.user_id == user_id)
    }
}
