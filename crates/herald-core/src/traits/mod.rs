// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the dispatch pipeline's components.
//!
//! Every collaborator the Processor touches is injected through one of
//! these traits, using `#[async_trait]` for dynamic dispatch compatibility.

pub mod blacklist;
pub mod delivery_log;
pub mod provider;
pub mod queue;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use blacklist::Blacklist;
pub use delivery_log::DeliveryLog;
pub use provider::SmsProvider;
pub use queue::DispatchQueue;
pub use store::RequestStore;
