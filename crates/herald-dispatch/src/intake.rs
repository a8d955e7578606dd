// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request intake: persist, enqueue, hand back an identifier.

use std::sync::Arc;

use herald_core::{
    DispatchQueue, Disposition, FailureCode, HeraldError, RequestId, RequestStore, SmsRequest,
};
use tracing::{debug, warn};

/// Detail text recorded when the initial enqueue fails.
const QUEUE_FAILURE_DETAIL: &str = "Failed to publish message to queue.";

/// Accepts new requests into the pipeline.
///
/// The caller always gets an identifier back, even when the request ends up
/// `FAILED(QUEUE_FAILURE)` immediately; the outcome is observed by polling
/// the request store.
pub struct Intake {
    store: Arc<dyn RequestStore>,
    queue: Arc<dyn DispatchQueue>,
}

impl Intake {
    pub fn new(store: Arc<dyn RequestStore>, queue: Arc<dyn DispatchQueue>) -> Self {
        Self { store, queue }
    }

    /// Creates a `PENDING` request and enqueues its identifier.
    ///
    /// If the enqueue fails, the request is transitioned to
    /// `FAILED(QUEUE_FAILURE)` so it never sits `PENDING` with no consumer.
    /// No retry is attempted; enqueue failure is final for this attempt.
    pub async fn submit(
        &self,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<RequestId, HeraldError> {
        let request = SmsRequest::new(recipient, body);
        let id = request.id.clone();

        self.store.save(&request).await?;
        debug!(request_id = %id, recipient = %request.recipient, "request persisted as PENDING");

        if let Err(e) = self.queue.publish(&id).await {
            warn!(request_id = %id, error = %e, "enqueue failed, failing request at intake");
            let disposition = Disposition::failed(FailureCode::QueueFailure, QUEUE_FAILURE_DETAIL);
            self.store.transition_from_pending(&id, &disposition).await?;
        }

        Ok(id)
    }
}
