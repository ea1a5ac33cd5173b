// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization adapter trait for private topic actions.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{NewPrivateTopic, PrivateTopic, UserId};

/// Decides whether a user may perform an action on a private topic.
///
/// Called by the services before any read state or topic data is touched.
/// Implementations answer yes or no; the caller turns a no into
/// [`ParleyError::Forbidden`].
#[async_trait]
pub trait Authorizer: PluginAdapter {
    async fn can_read(&self, user_id: UserId, topic: &PrivateTopic) -> Result<bool, ParleyError>;

    async fn can_create(
        &self,
        user_id: UserId,
        topic: &NewPrivateTopic,
    ) -> Result<bool, ParleyError>;

    async fn can_update(&self, user_id: UserId, topic: &PrivateTopic)
    -> Result<bool, ParleyError>;
}
