// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider gateway crate: the HTTP implementation of [`herald_core::SmsProvider`].

pub mod client;
pub mod payload;

pub use client::HttpSmsProvider;
