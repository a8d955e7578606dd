// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request lifecycle operations: save, lookup, and the conditional state
//! transition that keeps terminal states sticky.

use herald_core::{Disposition, HeraldError, RequestId, RequestState, SmsRequest};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

/// Insert a freshly created request row.
pub async fn save(db: &Database, request: &SmsRequest) -> Result<(), HeraldError> {
    let request = request.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sms_requests
                     (id, recipient, body, state, failure_code, failure_detail,
                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    request.id.as_str(),
                    request.recipient,
                    request.body,
                    request.state.to_string(),
                    request.failure_code.map(|c| c.to_string()),
                    request.failure_detail,
                    request.created_at,
                    request.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Point lookup by identifier.
pub async fn find_by_id(
    db: &Database,
    id: &RequestId,
) -> Result<Option<SmsRequest>, HeraldError> {
    let id = id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recipient, body, state, failure_code, failure_detail,
                        created_at, updated_at
                 FROM sms_requests WHERE id = ?1",
            )?;
            let request = stmt
                .query_row(params![id], row_to_request)
                .optional()?;
            Ok(request)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Compare-and-swap transition out of `PENDING`.
///
/// Applies the disposition only if the stored state is still `PENDING`.
/// Returns `true` when this call won the transition; `false` when the
/// request was already terminal or does not exist.
pub async fn transition_from_pending(
    db: &Database,
    id: &RequestId,
    disposition: &Disposition,
) -> Result<bool, HeraldError> {
    let id = id.as_str().to_string();
    let state = disposition.state().to_string();
    let (code, detail) = match disposition {
        Disposition::Sent => (None, None),
        Disposition::Failed { code, detail } => {
            (Some(code.to_string()), Some(detail.clone()))
        }
    };

    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE sms_requests
                 SET state = ?2, failure_code = ?3, failure_detail = ?4,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND state = 'PENDING'",
                params![id, state, code, detail],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_request(row: &rusqlite::Row) -> Result<SmsRequest, rusqlite::Error> {
    let state_str: String = row.get(3)?;
    let state = state_str.parse::<RequestState>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;

    let code_str: Option<String> = row.get(4)?;
    let failure_code = code_str
        .map(|s| {
            s.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;

    Ok(SmsRequest {
        id: RequestId(row.get(0)?),
        recipient: row.get(1)?,
        body: row.get(2)?,
        state,
        failure_code,
        failure_detail: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use herald_core::FailureCode;
    use tempfile::tempdir;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let (db, _dir) = setup_db().await;

        let request = SmsRequest::new("+919876543210", "hi");
        save(&db, &request).await.unwrap();

        let found = find_by_id(&db, &request.id).await.unwrap().unwrap();
        assert_eq!(found, request);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_unknown_id_returns_none() {
        let (db, _dir) = setup_db().await;
        let missing = find_by_id(&db, &RequestId("no-such-id".into())).await.unwrap();
        assert!(missing.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let (db, _dir) = setup_db().await;

        let request = SmsRequest::new("+919876543210", "hi");
        save(&db, &request).await.unwrap();
        let result = save(&db, &request).await;
        assert!(result.is_err(), "primary key must reject duplicate ids");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transition_wins_only_from_pending() {
        let (db, _dir) = setup_db().await;

        let request = SmsRequest::new("+919876543210", "hi");
        save(&db, &request).await.unwrap();

        let won = transition_from_pending(&db, &request.id, &Disposition::Sent)
            .await
            .unwrap();
        assert!(won);

        let found = find_by_id(&db, &request.id).await.unwrap().unwrap();
        assert_eq!(found.state, RequestState::Sent);
        assert!(found.failure_code.is_none());
        assert!(found.updated_at >= found.created_at);

        // Second transition loses: the terminal state is sticky.
        let lost = transition_from_pending(
            &db,
            &request.id,
            &Disposition::failed(FailureCode::ApiError, "Failed to send SMS."),
        )
        .await
        .unwrap();
        assert!(!lost);

        let found = find_by_id(&db, &request.id).await.unwrap().unwrap();
        assert_eq!(found.state, RequestState::Sent, "SENT must not be overwritten");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_transition_records_code_and_detail() {
        let (db, _dir) = setup_db().await;

        let request = SmsRequest::new("+917000000001", "hello");
        save(&db, &request).await.unwrap();

        let disposition =
            Disposition::failed(FailureCode::Blacklisted, "Phone number is blacklisted.");
        let won = transition_from_pending(&db, &request.id, &disposition)
            .await
            .unwrap();
        assert!(won);

        let found = find_by_id(&db, &request.id).await.unwrap().unwrap();
        assert_eq!(found.state, RequestState::Failed);
        assert_eq!(found.failure_code, Some(FailureCode::Blacklisted));
        assert_eq!(
            found.failure_detail.as_deref(),
            Some("Phone number is blacklisted.")
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transition_on_unknown_id_reports_loss() {
        let (db, _dir) = setup_db().await;
        let won = transition_from_pending(
            &db,
            &RequestId("ghost".into()),
            &Disposition::Sent,
        )
        .await
        .unwrap();
        assert!(!won);
        db.close().await.unwrap();
    }
}
