// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace chat: threads between a buyer and a seller about one listing,
//! their message logs, the offer sub-protocol, and new-message detection.
//!
//! # Components
//!
//! - [`ThreadStore`] - deterministic thread identity and get-or-create
//! - [`MessageLog`] - text, photo, and offer appends with preview and unread upkeep
//! - [`PreferenceStore`] - per-user notification flag
//! - [`NotificationDetector`] - hydration-guarded unread diffing into toasts
//! - [`ChatService`] - facade over all of the above

pub mod blocking;
pub mod messages;
pub mod notify;
pub mod offers;
pub mod preferences;
pub mod preview;
pub mod service;
pub mod thread_id;
pub mod threads;

pub use blocking::BlockGuard;
pub use messages::{can_withdraw_message, MessageLog, WITHDRAW_WINDOW_MS};
pub use notify::{DetectorStatus, NotificationDetector, NotificationSession};
pub use preferences::PreferenceStore;
pub use service::{ChatService, ChatServiceBuilder};
pub use thread_id::{make_thread_id, thread_id_for};
pub use threads::{ThreadContext, ThreadStore};
