// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only post operations.

use parley_core::types::{NewPost, Post};
use parley_core::{ParleyError, PostId, PrivateTopicId, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

const POST_COLUMNS: &str = "id, private_topic_id, position, user_id, content, ip, created_at";

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: PostId(row.get(0)?),
        private_topic_id: PrivateTopicId(row.get(1)?),
        position: row.get(2)?,
        user_id: UserId(row.get(3)?),
        content: row.get(4)?,
        ip: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a post at the topic's next position and bump the topic's activity.
///
/// Must run inside a transaction. Returns `None` when the topic is missing.
pub(crate) fn insert_post_tx(
    tx: &rusqlite::Transaction<'_>,
    topic_id: i64,
    user_id: i64,
    content: &str,
    ip: Option<&str>,
) -> rusqlite::Result<Option<Post>> {
    let last: Option<i64> = tx
        .query_row(
            "SELECT last_post_position FROM private_topics WHERE id = ?1",
            params![topic_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(last) = last else {
        return Ok(None);
    };
    let position = last + 1;

    tx.execute(
        "INSERT INTO private_posts (private_topic_id, position, user_id, content, ip)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![topic_id, position, user_id, content, ip],
    )?;
    let post_id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE private_topics SET
            last_post_position = ?1,
            posts_count = posts_count + 1,
            last_user_id = ?2,
            last_post_at = (SELECT created_at FROM private_posts WHERE id = ?3),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?4",
        params![position, user_id, post_id, topic_id],
    )?;

    select_post(tx, post_id)
}

fn select_post(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM private_posts WHERE id = ?1"),
        params![id],
        post_from_row,
    )
    .optional()
}

/// Append a post. Returns `None` when the topic does not exist.
pub async fn append_post(db: &Database, post: &NewPost) -> Result<Option<Post>, ParleyError> {
    let post = post.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Post>> {
            let tx = conn.transaction()?;
            let inserted = insert_post_tx(
                &tx,
                post.private_topic_id.0,
                post.user_id.0,
                &post.content,
                post.ip.as_deref(),
            )?;
            tx.commit()?;
            Ok(inserted)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a post by id.
pub async fn get_post(db: &Database, id: PostId) -> Result<Option<Post>, ParleyError> {
    db.connection()
        .call(move |conn| select_post(conn, id.0))
        .await
        .map_err(map_tr_err)
}

/// One page of a topic's posts, oldest first.
pub async fn list_posts(
    db: &Database,
    topic_id: PrivateTopicId,
    limit: u32,
    offset: u64,
) -> Result<Vec<Post>, ParleyError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Post>> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM private_posts
                 WHERE private_topic_id = ?1
                 ORDER BY position ASC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let posts = stmt
                .query_map(
                    params![topic_id.0, i64::from(limit), offset as i64],
                    post_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(posts)
        })
        .await
        .map_err(map_tr_err)
}
