// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete dispatch pipeline over a temp
//! SQLite database: real storage adapters, real intake and processor, a
//! scripted mock provider, and fault-injecting wrappers around the queue
//! and delivery log.

use std::sync::Arc;

use herald_core::{
    Blacklist, DispatchQueue, HeraldError, RequestId, RequestStore, SendOutcome,
    SmsRequest,
};
use herald_dispatch::{Intake, ProcessOutcome, Processor};
use herald_storage::{
    Database, SqliteBlacklist, SqliteDeliveryLog, SqliteDispatchQueue, SqliteRequestStore,
};

use crate::flaky::{FlakyDeliveryLog, FlakyQueue};
use crate::mock_provider::MockProvider;

/// Builder for creating test pipelines with configurable options.
pub struct TestHarnessBuilder {
    outcomes: Vec<SendOutcome>,
    blacklist_ttl_days: u32,
    max_attempts: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            blacklist_ttl_days: 7,
            max_attempts: 3,
        }
    }

    /// Script the provider's send outcomes, in order.
    pub fn with_provider_outcomes(mut self, outcomes: Vec<SendOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Override the blacklist retention window.
    pub fn with_blacklist_ttl_days(mut self, days: u32) -> Self {
        self.blacklist_ttl_days = days;
        self
    }

    /// Override the queue's bounded attempt budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Build the test harness, creating the temp database and wiring every
    /// pipeline component.
    pub async fn build(self) -> Result<TestHarness, HeraldError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| HeraldError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("harness.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        let store: Arc<dyn RequestStore> = Arc::new(SqliteRequestStore::new(db.clone()));
        let blacklist: Arc<dyn Blacklist> =
            Arc::new(SqliteBlacklist::new(db.clone(), self.blacklist_ttl_days));
        let queue = Arc::new(FlakyQueue::new(Arc::new(SqliteDispatchQueue::new(
            db.clone(),
            self.max_attempts,
        ))));
        let delivery_log = Arc::new(FlakyDeliveryLog::new(Arc::new(SqliteDeliveryLog::new(
            db.clone(),
        ))));
        let provider = Arc::new(MockProvider::with_outcomes(self.outcomes));

        let intake = Intake::new(store.clone(), queue.clone());
        let processor = Processor::new(
            store.clone(),
            blacklist.clone(),
            provider.clone(),
            delivery_log.clone(),
        );

        Ok(TestHarness {
            db,
            store,
            blacklist,
            queue,
            delivery_log,
            provider,
            intake,
            processor,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired dispatch pipeline over a temp SQLite database.
pub struct TestHarness {
    pub db: Database,
    pub store: Arc<dyn RequestStore>,
    pub blacklist: Arc<dyn Blacklist>,
    pub queue: Arc<FlakyQueue>,
    pub delivery_log: Arc<FlakyDeliveryLog>,
    pub provider: Arc<MockProvider>,
    pub intake: Intake,
    pub processor: Processor,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submit a request through intake.
    pub async fn submit(&self, recipient: &str, body: &str) -> Result<RequestId, HeraldError> {
        self.intake.submit(recipient, body).await
    }

    /// Claim and process one queued message the way a worker would,
    /// settling the queue entry from the outcome. `None` when the queue is
    /// empty.
    pub async fn process_next(&self) -> Result<Option<ProcessOutcome>, HeraldError> {
        let Some(message) = self.queue.dequeue().await? else {
            return Ok(None);
        };
        let outcome = self.processor.handle(&message.request_id).await;
        match outcome {
            ProcessOutcome::Completed => self.queue.ack(message.id).await?,
            ProcessOutcome::Retry => self.queue.fail(message.id).await?,
        }
        Ok(Some(outcome))
    }

    /// Drain the queue, processing until it is empty.
    pub async fn process_all(&self) -> Result<usize, HeraldError> {
        let mut processed = 0;
        while self.process_next().await?.is_some() {
            processed += 1;
        }
        Ok(processed)
    }

    /// Fetch a request record, failing the test if it is missing.
    pub async fn request(&self, id: &RequestId) -> SmsRequest {
        self.store
            .find_by_id(id)
            .await
            .expect("store read should succeed")
            .expect("request should exist")
    }
}

#[cfg(test)]
mod tests {
    use herald_core::RequestState;

    use super::*;

    #[tokio::test]
    async fn harness_wires_a_working_pipeline() {
        let harness = TestHarness::builder().build().await.unwrap();

        let id = harness.submit("+919876543210", "hi").await.unwrap();
        assert_eq!(harness.request(&id).await.state, RequestState::Pending);

        assert_eq!(harness.process_all().await.unwrap(), 1);
        assert_eq!(harness.request(&id).await.state, RequestState::Sent);
    }
}
