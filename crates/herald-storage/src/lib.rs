// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Herald SMS dispatch service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for the
//! request lifecycle, the crash-safe dispatch queue, the expiring blacklist,
//! and the searchable delivery log.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::{SqliteBlacklist, SqliteDeliveryLog, SqliteDispatchQueue, SqliteRequestStore};
pub use database::Database;
