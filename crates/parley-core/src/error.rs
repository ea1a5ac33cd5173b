// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley private topics service.

use thiserror::Error;

/// The primary error type used across all Parley adapter traits and services.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced topic, post, or queue entry does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A concurrent write was rejected by the backend.
    ///
    /// The SQLite store never produces this: read-state upserts are a single
    /// guarded statement on the single writer thread.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The authorizer denied an action for the given user.
    #[error("user {user_id} is not allowed to {action}")]
    Forbidden { user_id: i64, action: &'static str },

    /// Submitted input failed validation.
    #[error("invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Shorthand for a [`ParleyError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for [`ParleyError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
