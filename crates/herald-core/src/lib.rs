// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald SMS dispatch service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Herald workspace. Every pipeline
//! component is injected through traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use types::{
    DeliveryRecord, DispatchMessage, Disposition, FailureCode, Page, PageRequest, RequestId,
    RequestState, SendOutcome, SmsRequest,
};

// Re-export all trait seams at crate root.
pub use traits::{Blacklist, DeliveryLog, DispatchQueue, RequestStore, SmsProvider};
