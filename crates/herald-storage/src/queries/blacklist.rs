// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blacklist operations: batch suppression with per-recipient expiry.
//!
//! Expiry is enforced at query time; rows past their `expires_at` are
//! invisible to every read, so no compaction pass is needed.

use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;

/// Suppress every recipient in the batch until `now + ttl_days`.
///
/// Runs in one transaction: a failure partway leaves no recipient in the
/// batch suppressed. Re-adding a recipient refreshes its expiry.
pub async fn add(
    db: &Database,
    recipients: &[String],
    ttl_days: u32,
) -> Result<(), HeraldError> {
    if recipients.is_empty() {
        return Ok(());
    }
    let recipients = recipients.to_vec();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(i64::from(ttl_days)))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO blacklist (recipient, expires_at) VALUES (?1, ?2)
                     ON CONFLICT(recipient) DO UPDATE SET
                         expires_at = excluded.expires_at,
                         created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                )?;
                for recipient in &recipients {
                    stmt.execute(params![recipient, expires_at])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Clear suppression for every recipient in the batch, all-or-nothing.
pub async fn remove(db: &Database, recipients: &[String]) -> Result<(), HeraldError> {
    if recipients.is_empty() {
        return Ok(());
    }
    let recipients = recipients.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("DELETE FROM blacklist WHERE recipient = ?1")?;
                for recipient in &recipients {
                    stmt.execute(params![recipient])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Authoritative suppression lookup. Expired entries never count.
pub async fn is_suppressed(db: &Database, recipient: &str) -> Result<bool, HeraldError> {
    let recipient = recipient.to_string();
    db.connection()
        .call(move |conn| {
            let suppressed: bool = conn.query_row(
                "SELECT EXISTS(
                     SELECT 1 FROM blacklist
                     WHERE recipient = ?1
                       AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![recipient],
                |row| row.get(0),
            )?;
            Ok(suppressed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every currently suppressed (unexpired) recipient.
pub async fn list(db: &Database) -> Result<Vec<String>, HeraldError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT recipient FROM blacklist
                 WHERE expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 ORDER BY recipient",
            )?;
            let recipients = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(recipients)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
