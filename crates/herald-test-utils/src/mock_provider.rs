// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider gateway for deterministic testing.
//!
//! `MockProvider` implements `SmsProvider` with scripted outcomes, enabling
//! fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{RequestId, SendOutcome, SmsProvider};
use tokio::sync::Mutex;

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCall {
    pub recipient: String,
    pub correlation_id: RequestId,
    pub body: String,
}

/// A mock provider gateway that returns scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// `SendOutcome::Success` is returned. Every call is recorded for
/// call-count and payload assertions.
pub struct MockProvider {
    outcomes: Arc<Mutex<VecDeque<SendOutcome>>>,
    calls: Arc<Mutex<Vec<SentCall>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty outcome script.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<SendOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add an outcome to the end of the script.
    pub async fn add_outcome(&self, outcome: SendOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Number of send attempts made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsProvider for MockProvider {
    async fn send(
        &self,
        recipient: &str,
        correlation_id: &RequestId,
        body: &str,
    ) -> SendOutcome {
        self.calls.lock().await.push(SentCall {
            recipient: recipient.to_string(),
            correlation_id: correlation_id.clone(),
            body: body.to_string(),
        });
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(SendOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_outcome_when_script_empty() {
        let provider = MockProvider::new();
        let outcome = provider
            .send("+919876543210", &RequestId::generate(), "hi")
            .await;
        assert_eq!(outcome, SendOutcome::Success);
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn scripted_outcomes_returned_in_order() {
        let provider = MockProvider::with_outcomes(vec![
            SendOutcome::Rejected,
            SendOutcome::TransportError,
        ]);
        let id = RequestId::generate();

        assert_eq!(
            provider.send("+919876543210", &id, "a").await,
            SendOutcome::Rejected
        );
        assert_eq!(
            provider.send("+919876543210", &id, "b").await,
            SendOutcome::TransportError
        );
        // Script exhausted, falls back to success.
        assert_eq!(
            provider.send("+919876543210", &id, "c").await,
            SendOutcome::Success
        );
    }

    #[tokio::test]
    async fn calls_are_recorded_with_payloads() {
        let provider = MockProvider::new();
        let id = RequestId::generate();
        provider.send("+919876543210", &id, "hello").await;

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].recipient, "+919876543210");
        assert_eq!(calls[0].correlation_id, id);
        assert_eq!(calls[0].body, "hello");
    }
}
