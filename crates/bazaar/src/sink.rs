// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toast sink that writes notifications to the log.

use bazaar_core::{NotificationSink, Toast};
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn show_toast(&self, toast: Toast) {
        info!(title = %toast.title, message = %toast.message, "toast");
    }
}
