// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock authorizer for deterministic testing.
//!
//! `MockAuthorizer` answers every check from fixed flags and counts how often
//! it was asked, so tests can assert that an action consulted it.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parley_core::types::{NewPrivateTopic, PrivateTopic};
use parley_core::{AdapterType, Authorizer, HealthStatus, ParleyError, PluginAdapter, UserId};

pub struct MockAuthorizer {
    allow_read: bool,
    allow_create: bool,
    allow_update: bool,
    checks: AtomicUsize,
}

impl MockAuthorizer {
    /// Allows everything.
    pub fn allow_all() -> Self {
        Self::with(true, true, true)
    }

    /// Denies everything.
    pub fn deny_all() -> Self {
        Self::with(false, false, false)
    }

    pub fn with(allow_read: bool, allow_create: bool, allow_update: bool) -> Self {
        Self {
            allow_read,
            allow_create,
            allow_update,
            checks: AtomicUsize::new(0),
        }
    }

    /// Number of checks answered so far.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    fn answer(&self, allowed: bool) -> Result<bool, ParleyError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(allowed)
    }
}

impl Default for MockAuthorizer {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[async_trait]
impl PluginAdapter for MockAuthorizer {
    fn name(&self) -> &str {
        "mock-authorizer"
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
impl Authorizer for MockAuthorizer {
    async fn can_read(&self, _user_id: UserId, _topic: &PrivateTopic) -> Result<bool, ParleyError> {
        self.answer(self.allow_read)
    }

    async fn can_create(
        &self,
        _user_id: UserId,
        _topic: &NewPrivateTopic,
    ) -> Result<bool, ParleyError> {
        self.answer(self.allow_create)
    }

    async fn can_update(
        &self,
        _user_id: UserId,
        _topic: &PrivateTopic,
    ) -> Result<bool, ParleyError> {
        self.answer(self.allow_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewPrivateTopic {
        NewPrivateTopic {
            title: "t".into(),
            user_id: UserId(1),
            participant_ids: vec![UserId(1), UserId(2)],
            content: "c".into(),
            ip: None,
        }
    }

    #[tokio::test]
    async fn answers_from_flags_and_counts_checks() {
        let auth = MockAuthorizer::with(false, true, false);
        assert!(auth.can_create(UserId(1), &draft()).await.unwrap());
        assert_eq!(auth.checks(), 1);

        let deny = MockAuthorizer::deny_all();
        assert!(!deny.can_create(UserId(1), &draft()).await.unwrap());
        assert_eq!(deny.adapter_type(), AdapterType::Authorizer);
    }
}
