// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests against a throwaway SQLite database.
//!
//! # Components
//!
//! - [`MockAuthorizer`] - Authorizer with fixed answers per action
//! - [`RecordingNotifier`] - Notifier that captures deliveries for assertions
//! - [`TestHarness`] - Service, worker and storage wired over a temp database

pub mod harness;
pub mod mock_authorizer;
pub mod mock_notifier;

pub use harness::TestHarness;
pub use mock_authorizer::MockAuthorizer;
pub use mock_notifier::{Delivery, RecordingNotifier};
