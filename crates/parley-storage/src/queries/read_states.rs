// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per (user, topic) read state operations.
//!
//! Read states are written with a single `INSERT .. ON CONFLICT DO UPDATE`
//! statement keyed by the `(user_id, private_topic_id)` primary key. Under
//! the monotonic policy the update carries a `WHERE` guard on the stored
//! position, so even callers racing on separate connections can never move
//! a row backward.

use parley_core::types::{ReadState, ReadStateUpdate};
use parley_core::{ParleyError, PostId, PrivateTopicId, TouchOutcome, UserId, WritePolicy};
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::debug;

use crate::database::{map_tr_err, Database};

const UPSERT_MONOTONIC: &str = "INSERT INTO user_private_topic_read_states
        (user_id, private_topic_id, read_post_id, read_post_position, page, read_at)
     VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
     ON CONFLICT (user_id, private_topic_id) DO UPDATE SET
        read_post_id = excluded.read_post_id,
        read_post_position = excluded.read_post_position,
        page = excluded.page,
        read_at = excluded.read_at
     WHERE excluded.read_post_position > user_private_topic_read_states.read_post_position";

const UPSERT_LAST_WRITE_WINS: &str = "INSERT INTO user_private_topic_read_states
        (user_id, private_topic_id, read_post_id, read_post_position, page, read_at)
     VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
     ON CONFLICT (user_id, private_topic_id) DO UPDATE SET
        read_post_id = excluded.read_post_id,
        read_post_position = excluded.read_post_position,
        page = excluded.page,
        read_at = excluded.read_at";

const READ_STATE_COLUMNS: &str =
    "user_id, private_topic_id, read_post_id, read_post_position, page, read_at";

fn read_state_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReadState> {
    Ok(ReadState {
        user_id: UserId(row.get(0)?),
        private_topic_id: PrivateTopicId(row.get(1)?),
        read_post_id: PostId(row.get(2)?),
        read_post_position: row.get(3)?,
        page: row.get(4)?,
        read_at: row.get(5)?,
    })
}

/// Result of the upsert transaction before it is mapped onto `ParleyError`.
enum Upsert {
    Written(TouchOutcome),
    MissingTopic,
    MissingPost,
}

/// Record that a user has read up to `update.post_id`.
///
/// The post's position is read from `private_posts` inside the same
/// transaction, so a post from another topic is rejected as not found.
pub async fn upsert_read_state(
    db: &Database,
    update: &ReadStateUpdate,
    policy: WritePolicy,
) -> Result<TouchOutcome, ParleyError> {
    let ReadStateUpdate {
        user_id,
        private_topic_id: topic_id,
        post_id,
        page,
    } = *update;

    let result = db
        .connection()
        .call(move |conn| -> rusqlite::Result<Upsert> {
            let tx = conn.transaction()?;

            let position: Option<i64> = tx
                .query_row(
                    "SELECT position FROM private_posts WHERE id = ?1 AND private_topic_id = ?2",
                    params![post_id.0, topic_id.0],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(position) = position else {
                let topic_exists = tx
                    .query_row(
                        "SELECT 1 FROM private_topics WHERE id = ?1",
                        params![topic_id.0],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                return Ok(if topic_exists {
                    Upsert::MissingPost
                } else {
                    Upsert::MissingTopic
                });
            };

            let stored: Option<i64> = tx
                .query_row(
                    "SELECT read_post_position FROM user_private_topic_read_states
                     WHERE user_id = ?1 AND private_topic_id = ?2",
                    params![user_id.0, topic_id.0],
                    |row| row.get(0),
                )
                .optional()?;

            let sql = match policy {
                WritePolicy::Monotonic => UPSERT_MONOTONIC,
                WritePolicy::LastWriteWins => UPSERT_LAST_WRITE_WINS,
            };
            let changed = tx.execute(sql, params![user_id.0, topic_id.0, post_id.0, position, page])?;
            tx.commit()?;

            Ok(Upsert::Written(match stored {
                None => TouchOutcome::Created,
                Some(_) if changed == 0 => TouchOutcome::Unchanged,
                Some(previous) if position > previous => TouchOutcome::Advanced,
                Some(_) => TouchOutcome::Rewritten,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    match result {
        Upsert::Written(outcome) => {
            debug!(
                user_id = %user_id,
                topic_id = %topic_id,
                post_id = %post_id,
                page,
                %policy,
                %outcome,
                "read state upserted"
            );
            Ok(outcome)
        }
        Upsert::MissingTopic => Err(ParleyError::not_found("private topic", topic_id)),
        Upsert::MissingPost => Err(ParleyError::not_found("post", post_id)),
    }
}

/// The read state for one (user, topic) pair.
pub async fn get_read_state(
    db: &Database,
    user_id: UserId,
    topic_id: PrivateTopicId,
) -> Result<Option<ReadState>, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<ReadState>> {
            conn.query_row(
                &format!(
                    "SELECT {READ_STATE_COLUMNS} FROM user_private_topic_read_states
                     WHERE user_id = ?1 AND private_topic_id = ?2"
                ),
                params![user_id.0, topic_id.0],
                read_state_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Read states of `user_id` for a set of topics in a single query.
pub async fn read_states_for(
    db: &Database,
    user_id: UserId,
    topic_ids: &[PrivateTopicId],
) -> Result<Vec<ReadState>, ParleyError> {
    if topic_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = topic_ids.iter().map(|id| id.0).collect();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<ReadState>> {
            let placeholders = (2..ids.len() + 2)
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {READ_STATE_COLUMNS} FROM user_private_topic_read_states
                 WHERE user_id = ?1 AND private_topic_id IN ({placeholders})"
            ))?;
            let values = std::iter::once(user_id.0).chain(ids);
            let states = stmt
                .query_map(params_from_iter(values), read_state_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(states)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::posts::append_post;
    use crate::queries::topics::create_topic;
    use parley_core::types::{NewPost, NewPrivateTopic, Post};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    /// Creates a topic with `count` posts and returns them in position order.
    async fn topic_with_posts(db: &Database, count: usize) -> (PrivateTopicId, Vec<Post>) {
        let topic = create_topic(
            db,
            &NewPrivateTopic {
                title: "reading".into(),
                user_id: UserId(1),
                participant_ids: vec![UserId(2)],
                content: "post 1".into(),
                ip: None,
            },
        )
        .await
        .unwrap();
        for i in 2..=count {
            append_post(
                db,
                &NewPost {
                    private_topic_id: topic.id,
                    user_id: UserId(1),
                    content: format!("post {i}"),
                    ip: None,
                },
            )
            .await
            .unwrap();
        }
        let posts = crate::queries::posts::list_posts(db, topic.id, count as u32, 0)
            .await
            .unwrap();
        (topic.id, posts)
    }

    fn touch(user: i64, topic: PrivateTopicId, post: &Post, page: u32) -> ReadStateUpdate {
        ReadStateUpdate {
            user_id: UserId(user),
            private_topic_id: topic,
            post_id: post.id,
            page,
        }
    }

    #[tokio::test]
    async fn first_touch_creates_row() {
        let (db, _dir) = setup_db().await;
        let (topic, posts) = topic_with_posts(&db, 3).await;

        let outcome = upsert_read_state(&db, &touch(2, topic, &posts[1], 1), WritePolicy::Monotonic)
            .await
            .unwrap();
        assert_eq!(outcome, TouchOutcome::Created);

        let state = get_read_state(&db, UserId(2), topic).await.unwrap().unwrap();
        assert_eq!(state.read_post_id, posts[1].id);
        assert_eq!(state.read_post_position, 2);
        assert_eq!(state.page, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn monotonic_guard_rejects_older_posts() {
        let (db, _dir) = setup_db().await;
        let (topic, posts) = topic_with_posts(&db, 3).await;
        let policy = WritePolicy::Monotonic;

        upsert_read_state(&db, &touch(2, topic, &posts[1], 2), policy)
            .await
            .unwrap();
        let advanced = upsert_read_state(&db, &touch(2, topic, &posts[2], 3), policy)
            .await
            .unwrap();
        let stale = upsert_read_state(&db, &touch(2, topic, &posts[1], 2), policy)
            .await
            .unwrap();
        let same = upsert_read_state(&db, &touch(2, topic, &posts[2], 3), policy)
            .await
            .unwrap();

        assert_eq!(advanced, TouchOutcome::Advanced);
        assert_eq!(stale, TouchOutcome::Unchanged);
        assert_eq!(same, TouchOutcome::Unchanged);
        let state = get_read_state(&db, UserId(2), topic).await.unwrap().unwrap();
        assert_eq!(state.read_post_position, 3);
        assert_eq!(state.page, 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn last_write_wins_allows_regression() {
        let (db, _dir) = setup_db().await;
        let (topic, posts) = topic_with_posts(&db, 3).await;
        let policy = WritePolicy::LastWriteWins;

        upsert_read_state(&db, &touch(2, topic, &posts[2], 3), policy)
            .await
            .unwrap();
        let outcome = upsert_read_state(&db, &touch(2, topic, &posts[0], 1), policy)
            .await
            .unwrap();

        assert_eq!(outcome, TouchOutcome::Rewritten);
        let state = get_read_state(&db, UserId(2), topic).await.unwrap().unwrap();
        assert_eq!(state.read_post_position, 1);
        assert_eq!(state.page, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_topic_and_foreign_post_are_not_found() {
        let (db, _dir) = setup_db().await;
        let (topic_a, posts_a) = topic_with_posts(&db, 1).await;
        let (topic_b, _) = topic_with_posts(&db, 1).await;

        let err = upsert_read_state(
            &db,
            &touch(2, PrivateTopicId(999), &posts_a[0], 1),
            WritePolicy::Monotonic,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ParleyError::NotFound { entity: "private topic", .. }));

        let err = upsert_read_state(&db, &touch(2, topic_b, &posts_a[0], 1), WritePolicy::Monotonic)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::NotFound { entity: "post", .. }));

        assert!(get_read_state(&db, UserId(2), topic_b).await.unwrap().is_none());
        assert!(get_read_state(&db, UserId(2), topic_a).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn batch_fetch_returns_only_existing_rows() {
        let (db, _dir) = setup_db().await;
        let (topic_a, posts_a) = topic_with_posts(&db, 2).await;
        let (topic_b, posts_b) = topic_with_posts(&db, 2).await;
        let (topic_c, posts_c) = topic_with_posts(&db, 2).await;

        upsert_read_state(&db, &touch(2, topic_a, &posts_a[1], 1), WritePolicy::Monotonic)
            .await
            .unwrap();
        upsert_read_state(&db, &touch(2, topic_c, &posts_c[0], 1), WritePolicy::Monotonic)
            .await
            .unwrap();
        // Another user's row must not leak into user 2's batch.
        upsert_read_state(&db, &touch(1, topic_b, &posts_b[0], 1), WritePolicy::Monotonic)
            .await
            .unwrap();

        let mut states = read_states_for(&db, UserId(2), &[topic_a, topic_b, topic_c])
            .await
            .unwrap();
        states.sort_by_key(|s| s.private_topic_id);
        let topics: Vec<_> = states.iter().map(|s| s.private_topic_id).collect();
        assert_eq!(topics, vec![topic_a, topic_c]);
        assert_eq!(states[0].read_post_position, 2);
        assert_eq!(states[1].read_post_position, 1);

        assert!(read_states_for(&db, UserId(2), &[]).await.unwrap().is_empty());
        db.close().await.unwrap();
    }
}
