// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery log trait: append-only record of successful sends.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{DeliveryRecord, Page, PageRequest};

/// Append-only, searchable log of successfully dispatched messages.
///
/// Writes are advisory from the pipeline's perspective: a failed write is
/// reported by the caller but never rolls back the `SENT` state it
/// follows.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Appends one record for a successfully dispatched request.
    async fn record(&self, record: &DeliveryRecord) -> Result<(), HeraldError>;

    /// Records for one recipient within an inclusive ISO 8601 time window,
    /// newest first.
    async fn find_by_recipient(
        &self,
        recipient: &str,
        from: &str,
        to: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError>;

    /// Phrase search over message bodies, best match first.
    async fn search(
        &self,
        phrase: &str,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, HeraldError>;
}
