// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external SMS delivery API.
//!
//! Provides [`HttpSmsProvider`], the one [`SmsProvider`] implementation that
//! talks to a real endpoint. Each send is a single best-effort attempt; all
//! failure modes come back as [`SendOutcome`] values, never as errors.

use std::time::Duration;

use async_trait::async_trait;
use herald_core::{HeraldError, RequestId, SendOutcome, SmsProvider};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::payload::SendRequest;

/// HTTP gateway to the delivery provider.
///
/// Carries the API key as a default `Key` header and applies one request
/// timeout to every call. Success is the HTTP status class: 2xx is
/// `Success`, anything else the provider answers is `Rejected`, and a call
/// that never completes is `TransportError`.
#[derive(Debug, Clone)]
pub struct HttpSmsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSmsProvider {
    /// Creates a new provider gateway.
    ///
    /// # Arguments
    /// * `base_url` - Full messaging endpoint URL
    /// * `api_key` - Provider API key, sent as the `Key` header
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, HeraldError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Key",
            HeaderValue::from_str(&api_key).map_err(|e| {
                HeraldError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    async fn send(
        &self,
        recipient: &str,
        correlation_id: &RequestId,
        body: &str,
    ) -> SendOutcome {
        let payload = SendRequest::new(recipient, correlation_id, body);

        let response = match self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(request_id = %correlation_id, error = %e, "provider call never completed");
                return SendOutcome::TransportError;
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(request_id = %correlation_id, status = %status, "provider accepted message");
            SendOutcome::Success
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                request_id = %correlation_id,
                status = %status,
                body = %body,
                "provider rejected message"
            );
            SendOutcome::Rejected
        }
    }
}
