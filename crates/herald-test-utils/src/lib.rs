// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Provides mock pipeline components and test harness infrastructure for
//! fast, deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted provider gateway with call recording
//! - [`FlakyQueue`] - Queue wrapper that can be told to fail publishes
//! - [`FlakyDeliveryLog`] - Delivery log wrapper that can fail writes
//! - [`TestHarness`] - Full pipeline over a temp SQLite database

pub mod flaky;
pub mod harness;
pub mod mock_provider;

pub use flaky::{FlakyDeliveryLog, FlakyQueue};
pub use harness::TestHarness;
pub use mock_provider::MockProvider;
