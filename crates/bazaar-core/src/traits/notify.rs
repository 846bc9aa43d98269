// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink for surfaced "new message" events.

use crate::types::Toast;

/// Presents a toast to the user. Fire-and-forget: no result is observed.
pub trait NotificationSink: Send + Sync {
    fn show_toast(&self, toast: Toast);
}
