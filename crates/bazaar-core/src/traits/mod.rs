// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for every external collaborator of the chat core.
//!
//! Stateful backends extend the [`Adapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod blocking;
pub mod notify;
pub mod store;
pub mod upload;

pub use adapter::Adapter;
pub use blocking::BlockOracle;
pub use notify::NotificationSink;
pub use store::{DocumentStore, SnapshotCallback, Subscription};
pub use upload::UploadService;
