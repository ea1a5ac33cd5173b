// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Lifecycle-bearing adapters extend the [`PluginAdapter`] base trait; all
//! traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod notify;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::Authorizer;
pub use notify::Notifier;
pub use storage::{JobQueue, ReadStateStore, StorageAdapter, TopicStore};
