// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The core orchestrator: one queue delivery, one pass through the pipeline.
//!
//! Per request: re-read, blacklist gate, provider send, conditional state
//! transition, advisory delivery log write. Every step's failure mode is an
//! explicit value; nothing here panics the worker.

use std::sync::Arc;

use herald_core::{
    Blacklist, DeliveryLog, DeliveryRecord, Disposition, FailureCode, RequestId, RequestStore,
    SmsProvider,
};
use tracing::{debug, error, info, warn};

/// Detail text recorded for a suppressed recipient.
const BLACKLISTED_DETAIL: &str = "Phone number is blacklisted.";
/// Detail text recorded for a failed provider send.
const API_ERROR_DETAIL: &str = "Failed to send SMS.";

/// How the worker should settle the queue message after one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The business outcome is decided (terminal state written, CAS lost,
    /// already terminal, or request absent). Acknowledge; redelivery would
    /// not change anything.
    Completed,
    /// An infrastructure failure before any terminal transition. Fail the
    /// queue entry so it is redelivered within the bounded attempt budget.
    Retry,
}

/// Drives one request through blacklist gate, provider send, and state
/// transition.
pub struct Processor {
    store: Arc<dyn RequestStore>,
    blacklist: Arc<dyn Blacklist>,
    provider: Arc<dyn SmsProvider>,
    delivery_log: Arc<dyn DeliveryLog>,
}

impl Processor {
    pub fn new(
        store: Arc<dyn RequestStore>,
        blacklist: Arc<dyn Blacklist>,
        provider: Arc<dyn SmsProvider>,
        delivery_log: Arc<dyn DeliveryLog>,
    ) -> Self {
        Self {
            store,
            blacklist,
            provider,
            delivery_log,
        }
    }

    /// Processes one queued identifier.
    ///
    /// Terminal transitions are compare-and-swap out of `PENDING`, so a
    /// redelivered identifier whose request is already decided never reaches
    /// the provider a second time.
    pub async fn handle(&self, id: &RequestId) -> ProcessOutcome {
        let request = match self.store.find_by_id(id).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                // Data-integrity failure: the queue references a request the
                // store has no record of. Redelivery cannot make it appear.
                error!(request_id = %id, "queued request has no store record");
                return ProcessOutcome::Completed;
            }
            Err(e) => {
                warn!(request_id = %id, error = %e, "request store read failed");
                return ProcessOutcome::Retry;
            }
        };

        if request.state.is_terminal() {
            debug!(request_id = %id, state = %request.state, "redelivery of a settled request");
            return ProcessOutcome::Completed;
        }

        let suppressed = match self.blacklist.is_suppressed(&request.recipient).await {
            Ok(suppressed) => suppressed,
            Err(e) => {
                // The gate fails closed: unavailability is never "not
                // suppressed". Let the queue redeliver.
                warn!(request_id = %id, error = %e, "blacklist lookup failed");
                return ProcessOutcome::Retry;
            }
        };

        if suppressed {
            info!(request_id = %id, recipient = %request.recipient, "recipient is blacklisted");
            let disposition =
                Disposition::failed(FailureCode::Blacklisted, BLACKLISTED_DETAIL);
            return self.settle(id, &disposition).await;
        }

        let outcome = self.provider.send(&request.recipient, id, &request.body).await;
        debug!(request_id = %id, ?outcome, "provider send attempt finished");

        if !outcome.is_success() {
            let disposition = Disposition::failed(FailureCode::ApiError, API_ERROR_DETAIL);
            return self.settle(id, &disposition).await;
        }

        let won = match self.store.transition_from_pending(id, &Disposition::Sent).await {
            Ok(won) => won,
            Err(e) => {
                // The send already happened; retrying here risks a duplicate
                // send on redelivery, but leaving the request PENDING with no
                // further attempt would strand it. Bounded redelivery is the
                // reconciliation path.
                warn!(request_id = %id, error = %e, "state write failed after send");
                return ProcessOutcome::Retry;
            }
        };

        if !won {
            warn!(request_id = %id, "lost transition race after send; earlier outcome stands");
            return ProcessOutcome::Completed;
        }

        info!(request_id = %id, recipient = %request.recipient, "request sent");

        // Advisory bookkeeping: a failure here never reverses SENT and is
        // not retried within this invocation.
        let record = DeliveryRecord::new(id.clone(), request.recipient, request.body);
        if let Err(e) = self.delivery_log.record(&record).await {
            warn!(request_id = %id, error = %e, "delivery log write failed; SENT state stands");
        }

        ProcessOutcome::Completed
    }

    /// Applies a failure disposition via compare-and-swap.
    async fn settle(&self, id: &RequestId, disposition: &Disposition) -> ProcessOutcome {
        match self.store.transition_from_pending(id, disposition).await {
            Ok(true) => ProcessOutcome::Completed,
            Ok(false) => {
                warn!(request_id = %id, "lost transition race; earlier outcome stands");
                ProcessOutcome::Completed
            }
            Err(e) => {
                warn!(request_id = %id, error = %e, "state write failed");
                ProcessOutcome::Retry
            }
        }
    }
}
