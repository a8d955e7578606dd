// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting wrappers around real pipeline components.
//!
//! Each wrapper delegates to an inner implementation and can be switched
//! into a failing mode, for exercising the pipeline's partial-failure
//! paths against real storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{
    DeliveryLog, DeliveryRecord, DispatchMessage, DispatchQueue, HeraldError, Page, PageRequest,
    RequestId,
};

/// Queue wrapper whose `publish` can be told to fail.
pub struct FlakyQueue {
    inner: Arc<dyn DispatchQueue>,
    fail_publish: AtomicBool,
}

impl FlakyQueue {
    pub fn new(inner: Arc<dyn DispatchQueue>) -> Self {
        Self {
            inner,
            fail_publish: AtomicBool::new(false),
        }
    }

    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DispatchQueue for FlakyQueue {
    async fn publish(&self, id: &RequestId) -> Result<(), HeraldError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(HeraldError::Queue {
                message: "publish failure injected".into(),
                source: None,
            });
        }
        self.inner.publish(id).await
    }

    async fn dequeue(&self) -> Result<Option<DispatchMessage>, HeraldError> {
        self.inner.dequeue().await
    }

    async fn ack(&self, message_id: i64) -> Result<(), HeraldError> {
        self.inner.ack(message_id).await
    }

    async fn fail(&self, message_id: i64) -> Result<(), HeraldError> {
        self.inner.fail(message_id).await
    }
}

/// Delivery log wrapper whose `record` can be told to fail.
pub struct FlakyDeliveryLog {
    inner: Arc<dyn DeliveryLog>,
    fail_writes: AtomicBool,
}

impl FlakyDeliveryLog {
    pub fn new(inner: Arc<dyn DeliveryLog>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryLog for FlakyDeliveryLog {
    async fn record(&self, record: &DeliveryRecord) -> Result<(), HeraldError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HeraldError::Internal("log write failure injected".into()));
        }
        self.inner.record(record).await
    }

    async fn find_by_recipient(
        &self,
        recipient: &str,
        from: &str,
        to: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError> {
        self.inner.find_by_recipient(recipient, from, to, page).await
    }

    async fn search(
        &self,
        phrase: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError> {
        self.inner.search(phrase, page).await
    }
}
