// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations over the Herald schema, one module per table.

pub mod blacklist;
pub mod delivery_log;
pub mod queue;
pub mod requests;
