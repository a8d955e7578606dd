// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request store trait for the durable request lifecycle table.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{Disposition, RequestId, SmsRequest};

/// Durable store of every submitted request and its current state.
///
/// The store has exactly two writers: intake (the initial `PENDING` row
/// and, on enqueue failure, its one terminal transition) and the
/// processor. Terminal states are enforced by the conditional transition,
/// not by caller discipline.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persists a freshly created request.
    async fn save(&self, request: &SmsRequest) -> Result<(), HeraldError>;

    /// Point lookup by identifier. `None` when no record exists.
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<SmsRequest>, HeraldError>;

    /// Compare-and-swap transition out of `PENDING`.
    ///
    /// Applies the disposition and bumps `updated_at` only if the stored
    /// state is still `PENDING`. Returns `true` if this call won the
    /// transition, `false` if the request was already terminal (or does
    /// not exist). A lost swap is not an error.
    async fn transition_from_pending(
        &self,
        id: &RequestId,
        disposition: &Disposition,
    ) -> Result<bool, HeraldError>;
}
