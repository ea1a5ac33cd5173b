// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Private topic and participant operations.

use parley_core::types::{NewPrivateTopic, PrivateTopic};
use parley_core::{ParleyError, PrivateTopicId, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::queries::posts::insert_post_tx;

pub(crate) const TOPIC_COLUMNS: &str = "id, title, user_id, last_user_id, last_post_position, \
     posts_count, created_at, updated_at, last_post_at";

pub(crate) fn topic_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrivateTopic> {
    Ok(PrivateTopic {
        id: PrivateTopicId(row.get(0)?),
        title: row.get(1)?,
        user_id: UserId(row.get(2)?),
        last_user_id: UserId(row.get(3)?),
        last_post_position: row.get(4)?,
        posts_count: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        last_post_at: row.get(8)?,
    })
}

pub(crate) fn select_topic(
    conn: &rusqlite::Connection,
    id: i64,
) -> rusqlite::Result<Option<PrivateTopic>> {
    conn.query_row(
        &format!("SELECT {TOPIC_COLUMNS} FROM private_topics WHERE id = ?1"),
        params![id],
        topic_from_row,
    )
    .optional()
}

/// Create a topic, its participants and its first post in one transaction.
pub async fn create_topic(
    db: &Database,
    topic: &NewPrivateTopic,
) -> Result<PrivateTopic, ParleyError> {
    let topic = topic.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO private_topics (title, user_id, last_user_id) VALUES (?1, ?2, ?2)",
                params![topic.title, topic.user_id.0],
            )?;
            let id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO private_users (private_topic_id, user_id) VALUES (?1, ?2)",
                )?;
                stmt.execute(params![id, topic.user_id.0])?;
                for participant in &topic.participant_ids {
                    stmt.execute(params![id, participant.0])?;
                }
            }

            insert_post_tx(&tx, id, topic.user_id.0, &topic.content, topic.ip.as_deref())?;

            let created = select_topic(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a topic by id.
pub async fn get_topic(
    db: &Database,
    id: PrivateTopicId,
) -> Result<Option<PrivateTopic>, ParleyError> {
    db.connection()
        .call(move |conn| select_topic(conn, id.0))
        .await
        .map_err(map_tr_err)
}

/// Replace a topic's title. Returns `None` when the topic does not exist.
pub async fn update_topic_title(
    db: &Database,
    id: PrivateTopicId,
    title: &str,
) -> Result<Option<PrivateTopic>, ParleyError> {
    let title = title.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let changed = conn.execute(
                "UPDATE private_topics SET title = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![title, id.0],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_topic(conn, id.0)
        })
        .await
        .map_err(map_tr_err)
}

/// Topics `user_id` participates in, most recent activity first.
pub async fn list_topics_for_user(
    db: &Database,
    user_id: UserId,
    limit: u32,
    offset: u64,
) -> Result<Vec<PrivateTopic>, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.title, t.user_id, t.last_user_id, t.last_post_position,
                        t.posts_count, t.created_at, t.updated_at, t.last_post_at
                 FROM private_topics t
                 JOIN private_users pu ON pu.private_topic_id = t.id
                 WHERE pu.user_id = ?1
                 ORDER BY t.last_post_at DESC, t.id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;
            let topics = stmt
                .query_map(
                    params![user_id.0, i64::from(limit), offset as i64],
                    topic_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(topics)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of topics `user_id` participates in.
pub async fn count_topics_for_user(db: &Database, user_id: UserId) -> Result<u64, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM private_users WHERE user_id = ?1",
                params![user_id.0],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Participants of a topic in ascending id order.
pub async fn participants(db: &Database, id: PrivateTopicId) -> Result<Vec<UserId>, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM private_users WHERE private_topic_id = ?1 ORDER BY user_id",
            )?;
            let users = stmt
                .query_map(params![id.0], |row| Ok(UserId(row.get(0)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}

/// Whether `user_id` participates in the topic.
pub async fn is_participant(
    db: &Database,
    id: PrivateTopicId,
    user_id: UserId,
) -> Result<bool, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<_> {
            let found = conn
                .query_row(
                    "SELECT 1 FROM private_users WHERE private_topic_id = ?1 AND user_id = ?2",
                    params![id.0, user_id.0],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_tr_err)
}
