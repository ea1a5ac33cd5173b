// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier adapter trait for new private topic announcements.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{PrivateTopic, UserId};

/// Delivers "you were added to a private topic" notifications.
///
/// Transport (email, push, ...) is up to the implementation.
#[async_trait]
pub trait Notifier: PluginAdapter {
    async fn notify_private_topic_users(
        &self,
        topic: &PrivateTopic,
        recipients: &[UserId],
    ) -> Result<(), ParleyError>;
}
