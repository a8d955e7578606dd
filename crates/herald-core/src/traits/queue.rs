// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch queue trait: durable at-least-once hand-off of request ids.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{DispatchMessage, RequestId};

/// Durable channel carrying request identifiers from intake to workers.
///
/// Delivery is at-least-once: a claimed message whose worker never acks it
/// becomes visible again after a deadline, so consumers must tolerate
/// redelivery of the same identifier.
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    /// Appends a request identifier to the queue.
    async fn publish(&self, id: &RequestId) -> Result<(), HeraldError>;

    /// Claims the oldest deliverable message, marking it in flight until
    /// its visibility deadline. `None` when the queue is empty.
    async fn dequeue(&self) -> Result<Option<DispatchMessage>, HeraldError>;

    /// Completes a claimed message; it will not be delivered again.
    async fn ack(&self, message_id: i64) -> Result<(), HeraldError>;

    /// Releases a claimed message for redelivery, or buries it once the
    /// bounded attempt limit is exhausted.
    async fn fail(&self, message_id: i64) -> Result<(), HeraldError>;
}
