// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable job queue backing the new-topic notifications.
//!
//! An entry is `pending` until a worker claims it (`processing`, locked for a
//! while), then `completed` on ack. A failed attempt puts it back to
//! `pending`, or parks it as `failed` once `max_attempts` is used up. A claim
//! whose lock ran out can be taken again by the next worker.

use parley_core::types::QueueEntry;
use parley_core::ParleyError;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{map_tr_err, Database};

/// Claim lock, as an SQLite datetime modifier.
const CLAIM_LOCK: &str = "+5 minutes";

const COLUMNS: &str = "id, queue_name, payload, status, attempts, max_attempts,
                       created_at, updated_at, locked_until";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<QueueEntry> {
    Ok(QueueEntry {
        id: row.get(0)?,
        queue_name: row.get(1)?,
        payload: row.get(2)?,
        status: row.get(3)?,
        attempts: row.get(4)?,
        max_attempts: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        locked_until: row.get(8)?,
    })
}

pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
    max_attempts: i32,
) -> Result<i64, ParleyError> {
    let (queue_name, payload) = (queue_name.to_owned(), payload.to_owned());
    db.connection()
        .call(move |conn| -> rusqlite::Result<i64> {
            conn.query_row(
                "INSERT INTO queue (queue_name, payload, max_attempts)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![queue_name, payload, max_attempts],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Claim the oldest claimable entry of `queue_name`, oldest id first.
///
/// The select and the lock are one `UPDATE .. RETURNING` statement, so two
/// workers can never claim the same entry.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<QueueEntry>, ParleyError> {
    let queue_name = queue_name.to_owned();
    let sql = format!(
        "UPDATE queue
         SET status = 'processing',
             locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?2),
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = (
             SELECT id FROM queue
             WHERE queue_name = ?1
               AND (status = 'pending'
                    OR (status = 'processing'
                        AND locked_until < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
             ORDER BY id
             LIMIT 1
         )
         RETURNING {COLUMNS}"
    );
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<QueueEntry>> {
            conn.query_row(&sql, params![queue_name, CLAIM_LOCK], entry_from_row)
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn ack(db: &Database, id: i64) -> Result<(), ParleyError> {
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            conn.execute(
                "UPDATE queue
                 SET status = 'completed', locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    found(changed, id)
}

/// Count a failed attempt and release the claim.
pub async fn fail(db: &Database, id: i64) -> Result<(), ParleyError> {
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            conn.execute(
                "UPDATE queue
                 SET attempts = attempts + 1,
                     status = CASE WHEN attempts + 1 >= max_attempts
                                   THEN 'failed' ELSE 'pending' END,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    found(changed, id)
}

/// Delete the completed entries of `queue_name`. Failed entries stay.
pub async fn purge_completed(db: &Database, queue_name: &str) -> Result<usize, ParleyError> {
    let queue_name = queue_name.to_owned();
    db.connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            conn.execute(
                "DELETE FROM queue WHERE queue_name = ?1 AND status = 'completed'",
                params![queue_name],
            )
        })
        .await
        .map_err(map_tr_err)
}

fn found(changed: usize, id: i64) -> Result<(), ParleyError> {
    if changed == 0 {
        return Err(ParleyError::not_found("queue entry", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn state(db: &Database, id: i64) -> (String, i32, Option<String>) {
        db.connection()
            .call(move |conn| -> rusqlite::Result<(String, i32, Option<String>)> {
                conn.query_row(
                    "SELECT status, attempts, locked_until FROM queue WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn claimed_entry_is_locked_until_acked() {
        let (db, _dir) = temp_db().await;
        let first = enqueue(&db, "notify", r#"{"private_topic_id":1}"#, 3)
            .await
            .unwrap();
        let second = enqueue(&db, "notify", r#"{"private_topic_id":2}"#, 3)
            .await
            .unwrap();
        assert!(second > first);

        let claimed = dequeue(&db, "notify").await.unwrap().unwrap();
        assert_eq!(claimed.id, first);
        assert_eq!(claimed.status, "processing");
        assert!(claimed.locked_until.is_some());
        assert_eq!(claimed.payload, r#"{"private_topic_id":1}"#);

        // The locked entry is skipped in favor of the next one.
        assert_eq!(dequeue(&db, "notify").await.unwrap().unwrap().id, second);
        assert!(dequeue(&db, "notify").await.unwrap().is_none());

        ack(&db, first).await.unwrap();
        assert_eq!(state(&db, first).await, ("completed".to_string(), 0, None));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn names_partition_the_queue() {
        let (db, _dir) = temp_db().await;
        enqueue(&db, "notify", "{}", 3).await.unwrap();
        assert!(dequeue(&db, "digest").await.unwrap().is_none());
        assert!(dequeue(&db, "notify").await.unwrap().is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failures_are_retried_then_parked() {
        let (db, _dir) = temp_db().await;
        let id = enqueue(&db, "notify", "{}", 2).await.unwrap();

        dequeue(&db, "notify").await.unwrap().unwrap();
        fail(&db, id).await.unwrap();
        assert_eq!(state(&db, id).await, ("pending".to_string(), 1, None));

        let retry = dequeue(&db, "notify").await.unwrap().unwrap();
        assert_eq!(retry.attempts, 1);
        fail(&db, id).await.unwrap();
        assert_eq!(state(&db, id).await, ("failed".to_string(), 2, None));

        assert!(dequeue(&db, "notify").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_claim_is_taken_again() {
        let (db, _dir) = temp_db().await;
        let id = enqueue(&db, "notify", "{}", 3).await.unwrap();
        dequeue(&db, "notify").await.unwrap().unwrap();

        db.connection()
            .call(move |conn| -> rusqlite::Result<usize> {
                conn.execute(
                    "UPDATE queue SET locked_until = '2000-01-01T00:00:00.000Z' WHERE id = ?1",
                    params![id],
                )
            })
            .await
            .unwrap();

        assert_eq!(dequeue(&db, "notify").await.unwrap().unwrap().id, id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn purge_drops_only_completed_entries() {
        let (db, _dir) = temp_db().await;
        let done = enqueue(&db, "notify", "{}", 1).await.unwrap();
        let broken = enqueue(&db, "notify", "{}", 1).await.unwrap();
        let waiting = enqueue(&db, "notify", "{}", 1).await.unwrap();
        let other = enqueue(&db, "digest", "{}", 1).await.unwrap();

        dequeue(&db, "notify").await.unwrap().unwrap();
        ack(&db, done).await.unwrap();
        dequeue(&db, "notify").await.unwrap().unwrap();
        fail(&db, broken).await.unwrap();
        dequeue(&db, "digest").await.unwrap().unwrap();
        ack(&db, other).await.unwrap();

        assert_eq!(purge_completed(&db, "notify").await.unwrap(), 1);
        assert_eq!(purge_completed(&db, "notify").await.unwrap(), 0);
        assert_eq!(state(&db, broken).await.0, "failed");
        assert_eq!(state(&db, waiting).await.0, "pending");
        assert_eq!(state(&db, other).await.0, "completed");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_entry_is_not_found() {
        let (db, _dir) = temp_db().await;
        assert!(ack(&db, 404).await.unwrap_err().is_not_found());
        assert!(fail(&db, 404).await.unwrap_err().is_not_found());
        db.close().await.unwrap();
    }
}
