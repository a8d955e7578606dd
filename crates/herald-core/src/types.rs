// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Herald dispatch pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a submitted SMS request.
///
/// Generated once at intake, immutable for the lifetime of the request,
/// and carried through the queue and to the provider as the correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generates a fresh unique identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an SMS request.
///
/// `Pending` is the only non-terminal state. Terminal states are sticky:
/// the store's conditional transition refuses to overwrite them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Pending,
    Sent,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestState::Pending)
    }
}

/// Reason code recorded alongside a `FAILED` state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    /// Enqueueing onto the dispatch queue failed at intake.
    QueueFailure,
    /// The recipient was suppressed by the blacklist at processing time.
    Blacklisted,
    /// The provider send attempt did not succeed.
    ApiError,
}

/// Terminal outcome applied to a request by a conditional state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Sent,
    Failed { code: FailureCode, detail: String },
}

impl Disposition {
    pub fn failed(code: FailureCode, detail: impl Into<String>) -> Self {
        Disposition::Failed {
            code,
            detail: detail.into(),
        }
    }

    pub fn state(&self) -> RequestState {
        match self {
            Disposition::Sent => RequestState::Sent,
            Disposition::Failed { .. } => RequestState::Failed,
        }
    }
}

/// A durable record of one submitted SMS request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub id: RequestId,
    /// Destination phone number.
    pub recipient: String,
    /// Message text to deliver.
    pub body: String,
    pub state: RequestState,
    pub failure_code: Option<FailureCode>,
    pub failure_detail: Option<String>,
    /// ISO 8601 timestamp.
    pub created_at: String,
    /// ISO 8601 timestamp, updated on every state transition.
    pub updated_at: String,
}

impl SmsRequest {
    /// Creates a new pending request with a generated identifier.
    pub fn new(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        let now = now_iso8601();
        Self {
            id: RequestId::generate(),
            recipient: recipient.into(),
            body: body.into(),
            state: RequestState::Pending,
            failure_code: None,
            failure_detail: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Outcome of a single provider send attempt.
///
/// All three variants are ordinary values; the gateway never raises for an
/// expected provider-level rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider accepted the message.
    Success,
    /// The provider answered with a non-success response.
    Rejected,
    /// The call never completed (connect failure, timeout, protocol error).
    TransportError,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success)
    }
}

/// Append-only record of a successfully dispatched message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub request_id: RequestId,
    pub recipient: String,
    pub body: String,
    /// ISO 8601 timestamp of the successful send.
    pub sent_at: String,
}

impl DeliveryRecord {
    pub fn new(request_id: RequestId, recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            request_id,
            recipient: recipient.into(),
            body: body.into(),
            sent_at: now_iso8601(),
        }
    }
}

/// A queue message claimed for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchMessage {
    /// Queue-internal entry id, used for ack/fail.
    pub id: i64,
    /// The request identifier carried as the payload.
    pub request_id: RequestId,
    /// Failed delivery attempts so far, not counting the current claim.
    pub attempts: u32,
}

/// Zero-based page selector for delivery-log queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

impl PageRequest {
    /// Row offset of this page. Widened to `u64` so caller-controlled
    /// page numbers cannot overflow the multiplication.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of query results plus pagination totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(request.size)) as u32
        };
        Self {
            items,
            page: request.page,
            size: request.size,
            total_items,
            total_pages,
        }
    }

    /// Maps each item, keeping the pagination totals.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Current UTC time as an ISO 8601 string with millisecond precision.
///
/// Matches the `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` format the storage
/// layer uses, so string comparison orders timestamps correctly regardless
/// of which side generated them.
pub fn now_iso8601() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
