// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley private topics service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use parley_core::WritePolicy;
use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Forum identity, logging and pagination.
    #[serde(default)]
    pub forum: ForumConfig,

    /// Read state tracking behavior.
    #[serde(default)]
    pub read_state: ReadStateConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// New topic notification job settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Forum identity, logging and pagination configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForumConfig {
    /// Display name of the forum.
    #[serde(default = "default_forum_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Private topics per page in the topic listing.
    #[serde(default = "default_per_page")]
    pub topics_per_page: u32,

    /// Posts per page when showing a private topic.
    #[serde(default = "default_per_page")]
    pub posts_per_page: u32,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            name: default_forum_name(),
            log_level: default_log_level(),
            topics_per_page: default_per_page(),
            posts_per_page: default_per_page(),
        }
    }
}

fn default_forum_name() -> String {
    "parley".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_per_page() -> u32 {
    25
}

/// Read state tracking configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReadStateConfig {
    /// `monotonic` keeps read progress from moving backward when an earlier
    /// page is revisited; `last_write_wins` records every visit as-is.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// New private topic notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Enqueue a notification job when a private topic is created.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// Queue the notification jobs are written to.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Attempts before a notification job is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            queue_name: default_queue_name(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_queue_name() -> String {
    "notify_private_topic_users".to_string()
}

fn default_max_attempts() -> i32 {
    3
}
