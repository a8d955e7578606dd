// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery log operations: append-only writes plus the two query shapes
//! the read surface needs (recipient + time window, and phrase search via
//! FTS5/BM25).

use herald_core::{DeliveryRecord, HeraldError, Page, PageRequest, RequestId};
use rusqlite::params;

use crate::database::Database;

/// Append one record for a successfully dispatched request.
pub async fn record(db: &Database, record: &DeliveryRecord) -> Result<(), HeraldError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO delivery_log (request_id, recipient, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.request_id.as_str(),
                    record.recipient,
                    record.body,
                    record.sent_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Records for one recipient within an inclusive time window, newest first.
pub async fn find_by_recipient(
    db: &Database,
    recipient: &str,
    from: &str,
    to: &str,
    page: PageRequest,
) -> Result<Page<DeliveryRecord>, HeraldError> {
    let recipient = recipient.to_string();
    let from = from.to_string();
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let total: u64 = conn.query_row(
                "SELECT COUNT(*) FROM delivery_log
                 WHERE recipient = ?1 AND sent_at >= ?2 AND sent_at <= ?3",
                params![recipient, from, to],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(
                "SELECT request_id, recipient, body, sent_at
                 FROM delivery_log
                 WHERE recipient = ?1 AND sent_at >= ?2 AND sent_at <= ?3
                 ORDER BY sent_at DESC
                 LIMIT ?4 OFFSET ?5",
            )?;
            let items = stmt
                .query_map(
                    params![recipient, from, to, page.size, page.offset()],
                    row_to_record,
                )?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Page::new(items, page, total))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Phrase search over message bodies, best BM25 match first.
pub async fn search(
    db: &Database,
    phrase: &str,
    page: PageRequest,
) -> Result<Page<DeliveryRecord>, HeraldError> {
    // Quote the input as a single FTS5 phrase so user text is never
    // interpreted as query syntax.
    let match_expr = format!("\"{}\"", phrase.replace('"', "\"\""));
    db.connection()
        .call(move |conn| {
            let total: u64 = conn.query_row(
                "SELECT COUNT(*) FROM delivery_log_fts WHERE delivery_log_fts MATCH ?1",
                params![match_expr],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(
                "SELECT d.request_id, d.recipient, d.body, d.sent_at
                 FROM delivery_log_fts
                 JOIN delivery_log d ON d.id = delivery_log_fts.rowid
                 WHERE delivery_log_fts MATCH ?1
                 ORDER BY bm25(delivery_log_fts)
                 LIMIT ?2 OFFSET ?3",
            )?;
            let items = stmt
                .query_map(params![match_expr, page.size, page.offset()], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Page::new(items, page, total))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_record(row: &rusqlite::Row) -> Result<DeliveryRecord, rusqlite::Error> {
    Ok(DeliveryRecord {
        request_id: RequestId(row.get(0)?),
        recipient: row.get(1)?,
        body: row.get(2)?,
        sent_at: row.get(3)?,
    })
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

    fn record_at(recipient: &str, body: &str, sent_at: &str) -> DeliveryRecord {
        DeliveryRecord {
            request_id: RequestId::generate(),
            recipient: recipient.into(),
            body: body.into(),
            sent_at: sent_at.into(),
        }
    }

    #[tokio::test]
    async fn window_query_is_inclusive_and_newest_first() {
        let (db, _dir) = setup_db().await;

        record(&db, &record_at("+919876543210", "one", "2026-08-01T10:00:00.000Z"))
            .await
            .unwrap();
        record(&db, &record_at("+919876543210", "two", "2026-08-02T10:00:00.000Z"))
            .await
            .unwrap();
        record(&db, &record_at("+919876543210", "outside", "2026-08-05T10:00:00.000Z"))
            .await
            .unwrap();
        record(&db, &record_at("+917000000001", "other recipient", "2026-08-01T12:00:00.000Z"))
            .await
            .unwrap();

        let page = find_by_recipient(
            &db,
            "+919876543210",
            "2026-08-01T10:00:00.000Z",
            "2026-08-02T10:00:00.000Z",
            PageRequest::default(),
        )
        .await
        .unwrap();

        assert_eq!(page.total_items, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].body, "two");
        assert_eq!(page.items[1].body, "one");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn window_query_paginates() {
        let (db, _dir) = setup_db().await;

        for day in 1..=3 {
            let sent_at = format!("2026-08-0{day}T10:00:00.000Z");
            record(&db, &record_at("+919876543210", "msg", &sent_at))
                .await
                .unwrap();
        }

        let first = find_by_recipient(
            &db,
            "+919876543210",
            "2026-08-01T00:00:00.000Z",
            "2026-08-31T23:59:59.999Z",
            PageRequest { page: 0, size: 2 },
        )
        .await
        .unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_items, 3);
        assert_eq!(first.total_pages, 2);

        let second = find_by_recipient(
            &db,
            "+919876543210",
            "2026-08-01T00:00:00.000Z",
            "2026-08-31T23:59:59.999Z",
            PageRequest { page: 1, size: 2 },
        )
        .await
        .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.page, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn phrase_search_matches_bodies() {
        let (db, _dir) = setup_db().await;

        record(
            &db,
            &record_at("+919876543210", "your appointment reminder for monday", "2026-08-01T10:00:00.000Z"),
        )
        .await
        .unwrap();
        record(
            &db,
            &record_at("+917000000001", "otp code 123456", "2026-08-01T11:00:00.000Z"),
        )
        .await
        .unwrap();

        let hits = search(&db, "appointment reminder", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(hits.total_items, 1);
        assert_eq!(hits.items[0].recipient, "+919876543210");

        let misses = search(&db, "quantum physics", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(misses.total_items, 0);
        assert!(misses.items.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn phrase_search_is_not_query_syntax() {
        let (db, _dir) = setup_db().await;

        record(
            &db,
            &record_at("+919876543210", "say \"hi\" to the team", "2026-08-01T10:00:00.000Z"),
        )
        .await
        .unwrap();

        // Quotes and operators in user input must be treated literally.
        let hits = search(&db, "\"hi\"", PageRequest::default()).await.unwrap();
        assert_eq!(hits.total_items, 1);

        let odd = search(&db, "hi AND", PageRequest::default()).await.unwrap();
        assert_eq!(odd.total_items, 0);

        db.close().await.unwrap();
    }
}
