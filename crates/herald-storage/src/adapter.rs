// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait implementations binding the Herald seams to the SQLite queries.
//!
//! Each adapter is a thin handle over a shared [`Database`] clone; all of
//! them funnel writes through the same background connection.

use async_trait::async_trait;
use herald_core::{
    Blacklist, DeliveryLog, DeliveryRecord, DispatchMessage, DispatchQueue, Disposition,
    HeraldError, Page, PageRequest, RequestId, RequestStore, SmsRequest,
};

use crate::database::Database;
use crate::queries;

/// Name of the queue carrying request identifiers to the workers.
const DISPATCH_QUEUE: &str = "sms_dispatch";

/// SQLite-backed request lifecycle store.
#[derive(Clone)]
pub struct SqliteRequestStore {
    db: Database,
}

impl SqliteRequestStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestStore for SqliteRequestStore {
    async fn save(&self, request: &SmsRequest) -> Result<(), HeraldError> {
        queries::requests::save(&self.db, request).await
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<SmsRequest>, HeraldError> {
        queries::requests::find_by_id(&self.db, id).await
    }

    async fn transition_from_pending(
        &self,
        id: &RequestId,
        disposition: &Disposition,
    ) -> Result<bool, HeraldError> {
        queries::requests::transition_from_pending(&self.db, id, disposition).await
    }
}

/// SQLite-backed blacklist with a configurable retention window.
#[derive(Clone)]
pub struct SqliteBlacklist {
    db: Database,
    ttl_days: u32,
}

impl SqliteBlacklist {
    pub fn new(db: Database, ttl_days: u32) -> Self {
        Self { db, ttl_days }
    }
}

#[async_trait]
impl Blacklist for SqliteBlacklist {
    async fn add(&self, recipients: &[String]) -> Result<(), HeraldError> {
        queries::blacklist::add(&self.db, recipients, self.ttl_days).await
    }

    async fn remove(&self, recipients: &[String]) -> Result<(), HeraldError> {
        queries::blacklist::remove(&self.db, recipients).await
    }

    async fn is_suppressed(&self, recipient: &str) -> Result<bool, HeraldError> {
        queries::blacklist::is_suppressed(&self.db, recipient).await
    }

    async fn list(&self) -> Result<Vec<String>, HeraldError> {
        queries::blacklist::list(&self.db).await
    }
}

/// SQLite-backed dispatch queue with a bounded redelivery budget.
#[derive(Clone)]
pub struct SqliteDispatchQueue {
    db: Database,
    max_attempts: u32,
}

impl SqliteDispatchQueue {
    pub fn new(db: Database, max_attempts: u32) -> Self {
        Self { db, max_attempts }
    }
}

#[async_trait]
impl DispatchQueue for SqliteDispatchQueue {
    async fn publish(&self, id: &RequestId) -> Result<(), HeraldError> {
        queries::queue::enqueue(&self.db, DISPATCH_QUEUE, id.as_str(), self.max_attempts)
            .await
            .map(|_| ())
            .map_err(|e| HeraldError::Queue {
                message: "failed to publish to dispatch queue".into(),
                source: Some(Box::new(e)),
            })
    }

    async fn dequeue(&self) -> Result<Option<DispatchMessage>, HeraldError> {
        let entry = queries::queue::dequeue(&self.db, DISPATCH_QUEUE).await?;
        Ok(entry.map(|e| DispatchMessage {
            id: e.id,
            request_id: RequestId(e.payload),
            attempts: e.attempts,
        }))
    }

    async fn ack(&self, message_id: i64) -> Result<(), HeraldError> {
        queries::queue::ack(&self.db, message_id).await
    }

    async fn fail(&self, message_id: i64) -> Result<(), HeraldError> {
        queries::queue::fail(&self.db, message_id).await
    }
}

/// SQLite-backed delivery log with FTS5 phrase search.
#[derive(Clone)]
pub struct SqliteDeliveryLog {
    db: Database,
}

impl SqliteDeliveryLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryLog for SqliteDeliveryLog {
    async fn record(&self, record: &DeliveryRecord) -> Result<(), HeraldError> {
        queries::delivery_log::record(&self.db, record).await
    }

    async fn find_by_recipient(
        &self,
        recipient: &str,
        from: &str,
        to: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError> {
        queries::delivery_log::find_by_recipient(&self.db, recipient, from, to, page).await
    }

    async fn search(
        &self,
        phrase: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError> {
        queries::delivery_log::search(&self.db, phrase, page).await
    }
}
