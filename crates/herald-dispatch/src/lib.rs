// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The asynchronous dispatch pipeline for the Herald SMS service.
//!
//! Three pieces:
//! - [`Intake`] accepts a request, persists it as `PENDING`, and enqueues
//!   its identifier for processing.
//! - [`Processor`] consumes one identifier at a time: blacklist gate,
//!   provider send, conditional state transition, advisory delivery log.
//! - [`WorkerPool`] runs N concurrent pollers that drive the processor and
//!   map its outcomes onto queue acknowledgement.

pub mod intake;
pub mod processor;
pub mod shutdown;
pub mod worker;

pub use intake::Intake;
pub use processor::{ProcessOutcome, Processor};
pub use shutdown::install_signal_handler;
pub use worker::WorkerPool;
