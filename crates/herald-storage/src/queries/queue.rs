// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for crash-safe, at-least-once dispatch hand-off.

use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;

/// A claimed queue row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: i64,
    pub payload: String,
    /// Failed delivery attempts so far (not counting the current claim).
    pub attempts: u32,
}

/// Enqueue a new payload. Returns the auto-generated queue entry ID.
pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
    max_attempts: u32,
) -> Result<i64, HeraldError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO queue (queue_name, payload, max_attempts) VALUES (?1, ?2, ?3)",
                params![queue_name, payload, max_attempts],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim the next deliverable entry from the named queue.
///
/// Atomically selects the oldest entry that is either pending or whose
/// processing claim has expired, and marks it processing with a 5-minute
/// visibility deadline. An expired claim becoming deliverable again is
/// what makes delivery at-least-once. Returns `None` if nothing is
/// deliverable.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<QueueEntry>, HeraldError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| {
            // Transaction makes the find + claim atomic.
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(
                    "SELECT id, payload, attempts
                     FROM queue
                     WHERE queue_name = ?1
                       AND (status = 'pending'
                            OR (status = 'processing'
                                AND locked_until < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
                     ORDER BY id ASC
                     LIMIT 1",
                )?;
                stmt.query_row(params![queue_name], |row| {
                    Ok(QueueEntry {
                        id: row.get(0)?,
                        payload: row.get(1)?,
                        attempts: row.get(2)?,
                    })
                })
            };

            match result {
                Ok(entry) => {
                    tx.execute(
                        "UPDATE queue SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![entry.id],
                    )?;
                    tx.commit()?;
                    Ok(Some(entry))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Acknowledge successful processing of a queue entry.
///
/// Marks the entry as "completed"; it is never delivered again.
pub async fn ack(db: &Database, id: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a queue entry as failed.
///
/// Increments attempts. If attempts >= max_attempts, sets status to "failed".
/// Otherwise resets to "pending" for redelivery and clears the claim.
pub async fn fail(db: &Database, id: i64) -> Result<(), HeraldError> {
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (u32, u32) = conn.query_row(
                "SELECT attempts, max_attempts FROM queue WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            let status = if new_attempts >= max_attempts {
                "failed"
            } else {
                "pending"
            };
            conn.execute(
                "UPDATE queue SET status = ?1, attempts = ?2,
                 locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![status, new_attempts, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn status_of(db: &Database, id: i64) -> String {
        db.connection()
            .call(move |conn| -> Result<String, rusqlite::Error> {
                conn.query_row(
                    "SELECT status FROM queue WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn enqueue_and_dequeue_lifecycle() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "dispatch", "req-1", 3).await.unwrap();
        assert!(id > 0);

        let entry = dequeue(&db, "dispatch").await.unwrap().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.payload, "req-1");
        assert_eq!(entry.attempts, 0);

        // Claimed entry is invisible until its deadline passes.
        let next = dequeue(&db, "dispatch").await.unwrap();
        assert!(next.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_delivers_oldest_first() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "dispatch", "first", 3).await.unwrap();
        enqueue(&db, "dispatch", "second", 3).await.unwrap();

        let entry = dequeue(&db, "dispatch").await.unwrap().unwrap();
        assert_eq!(entry.payload, "first");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_marks_completed() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "dispatch", "req-1", 3).await.unwrap();
        let _entry = dequeue(&db, "dispatch").await.unwrap().unwrap();

        ack(&db, id).await.unwrap();
        assert_eq!(status_of(&db, id).await, "completed");

        // Completed entries are never redelivered.
        let next = dequeue(&db, "dispatch").await.unwrap();
        assert!(next.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_increments_attempts_and_re_pends() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "dispatch", "req-1", 3).await.unwrap();
        let _entry = dequeue(&db, "dispatch").await.unwrap().unwrap();

        fail(&db, id).await.unwrap();
        assert_eq!(status_of(&db, id).await, "pending");

        let entry = dequeue(&db, "dispatch").await.unwrap().unwrap();
        assert_eq!(entry.attempts, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_buries_entry_at_max_attempts() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "dispatch", "req-1", 2).await.unwrap();

        for _ in 0..2 {
            let _entry = dequeue(&db, "dispatch").await.unwrap().unwrap();
            fail(&db, id).await.unwrap();
        }

        assert_eq!(status_of(&db, id).await, "failed");
        let next = dequeue(&db, "dispatch").await.unwrap();
        assert!(next.is_none(), "buried entries must not be redelivered");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn expired_claim_becomes_deliverable_again() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "dispatch", "req-1", 3).await.unwrap();
        let _entry = dequeue(&db, "dispatch").await.unwrap().unwrap();

        // Simulate a worker that claimed the entry and died: move the
        // visibility deadline into the past.
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE queue
                     SET locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-1 minutes')
                     WHERE id = ?1",
                    params![id],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let entry = dequeue(&db, "dispatch").await.unwrap();
        assert!(entry.is_some(), "expired claim must be redelivered");
        assert_eq!(entry.unwrap().id, id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_empty_queue_returns_none() {
        let (db, _dir) = setup_db().await;
        let result = dequeue(&db, "dispatch").await.unwrap();
        assert!(result.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queues_are_isolated_by_name() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "other", "req-1", 3).await.unwrap();
        let result = dequeue(&db, "dispatch").await.unwrap();
        assert!(result.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_writers_no_sqlite_busy() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // Spawn 10 concurrent tasks all writing through the same Database.
        let mut handles = Vec::new();
        for i in 0..10 {
            let conn = db.connection().clone();
            let handle = tokio::spawn(async move {
                conn.call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        "INSERT INTO queue (queue_name, payload) VALUES (?1, ?2)",
                        params![format!("q-{i}"), format!("req-{i}")],
                    )?;
                    Ok(())
                })
                .await
            });
            handles.push(handle);
        }

        // All should complete without SQLITE_BUSY.
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "concurrent write failed: {result:?}");
        }

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 10);

        db.close().await.unwrap();
    }
}
