// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blacklist guard trait: suppressed recipients with automatic expiry.

use async_trait::async_trait;

use crate::error::HeraldError;

/// Key-value guard over suppressed recipients.
///
/// Entries expire automatically after the configured retention window;
/// absence is the default state and expired entries are never visible to
/// any of these operations.
#[async_trait]
pub trait Blacklist: Send + Sync {
    /// Suppresses every recipient in the batch for the retention window
    /// starting now. All-or-nothing: a failure leaves no recipient in the
    /// batch suppressed.
    async fn add(&self, recipients: &[String]) -> Result<(), HeraldError>;

    /// Clears suppression for every recipient in the batch, all-or-nothing.
    async fn remove(&self, recipients: &[String]) -> Result<(), HeraldError>;

    /// Authoritative point lookup used by the processor's gate.
    ///
    /// Fails closed: an unavailable store surfaces as an error, never as
    /// `Ok(false)`.
    async fn is_suppressed(&self, recipient: &str) -> Result<bool, HeraldError>;

    /// Every currently suppressed (unexpired) recipient.
    async fn list(&self) -> Result<Vec<String>, HeraldError>;
}
