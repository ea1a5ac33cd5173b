// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the parley-topics integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parley_config::model::StorageConfig;
use parley_core::types::{NewPost, NewPrivateTopic, Post, PrivateTopic};
use parley_core::{StorageAdapter, TopicStore, UserId};
use parley_storage::SqliteStorage;
use tempfile::TempDir;

pub struct Fixture {
    pub storage: Arc<SqliteStorage>,
    _dir: TempDir,
}

pub async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topics.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();
    Fixture {
        storage: Arc::new(storage),
        _dir: dir,
    }
}

/// A topic between `author` and `others` holding `posts` posts, oldest first.
pub async fn topic_with_posts(
    store: &SqliteStorage,
    author: i64,
    others: &[i64],
    posts: usize,
) -> (PrivateTopic, Vec<Post>) {
    assert!(posts >= 1);
    let topic = store
        .create_topic(&NewPrivateTopic {
            title: format!("topic by {author}"),
            user_id: UserId(author),
            participant_ids: std::iter::once(author)
                .chain(others.iter().copied())
                .map(UserId)
                .collect(),
            content: "post 1".into(),
            ip: None,
        })
        .await
        .unwrap();
    for i in 2..=posts {
        store
            .append_post(&NewPost {
                private_topic_id: topic.id,
                user_id: UserId(author),
                content: format!("post {i}"),
                ip: None,
            })
            .await
            .unwrap();
    }
    let all = store.list_posts(topic.id, posts as u32, 0).await.unwrap();
    let topic = store.get_topic(topic.id).await.unwrap().unwrap();
    (topic, all)
}
