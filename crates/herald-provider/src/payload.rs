// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the delivery provider's messaging API.

use herald_core::RequestId;
use serde::Serialize;

/// Top-level request body for one outbound SMS.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub delivery_channel: String,
    pub channels: Channels,
    pub destination: Vec<Destination>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Channels {
    pub sms: SmsChannel,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsChannel {
    pub text: String,
}

/// One destination entry: a single msisdn tagged with the request id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub msisdn: Vec<String>,
    pub correlation_id: String,
}

impl SendRequest {
    /// Builds the provider payload for one recipient and one message.
    pub fn new(recipient: &str, correlation_id: &RequestId, text: &str) -> Self {
        Self {
            delivery_channel: "sms".to_string(),
            channels: Channels {
                sms: SmsChannel {
                    text: text.to_string(),
                },
            },
            destination: vec![Destination {
                msisdn: vec![recipient.to_string()],
                correlation_id: correlation_id.as_str().to_string(),
            }],
        }
    }
}
