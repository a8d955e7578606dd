// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the Herald SMS dispatch service.
//!
//! Exposes intake, request lookup, blacklist administration, and delivery
//! log queries as a JSON REST surface built on axum. All responses are
//! enveloped: `{"data": ...}` on success, `{"error": {"code", "message"}}`
//! on failure.

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState, ServerConfig};
