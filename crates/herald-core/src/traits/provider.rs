// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider gateway trait for the external SMS delivery API.

use async_trait::async_trait;

use crate::types::{RequestId, SendOutcome};

/// Outbound gateway to the external delivery provider.
///
/// One call is one best-effort attempt: no retry, backoff, or circuit
/// breaking at this layer. Every way an attempt can end is encoded in
/// [`SendOutcome`]; the signature has no error channel.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Sends one message to one recipient, tagged with the request
    /// identifier for traceability.
    async fn send(
        &self,
        recipient: &str,
        correlation_id: &RequestId,
        body: &str,
    ) -> SendOutcome;
}
