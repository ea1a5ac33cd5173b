// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley private topics service.
//!
//! This crate provides the domain records, the shared error type, and the
//! adapter traits that storage backends, authorizers and notifiers implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{
    AdapterType, HealthStatus, PostId, PrivateTopicId, ReadProgress, TouchOutcome, UserId,
    WritePolicy,
};

pub use traits::{
    Authorizer, JobQueue, Notifier, PluginAdapter, ReadStateStore, StorageAdapter, TopicStore,
};
