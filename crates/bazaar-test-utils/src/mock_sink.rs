// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink that captures toasts for assertion in tests.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;

use bazaar_core::{NotificationSink, Toast};

/// Records every toast it is shown.
#[derive(Debug, Default)]
pub struct RecordingSink {
    toasts: Mutex<Vec<Toast>>,
    notify: Notify,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self) -> usize {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Waits until at least `count` toasts arrived or `timeout` elapsed,
    /// then returns everything recorded so far.
    pub async fn wait_for_count(&self, count: usize, timeout: Duration) -> Vec<Toast> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if self.count() >= count {
                break;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                break;
            }
        }
        self.toasts()
    }
}

impl NotificationSink for RecordingSink {
    fn show_toast(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(toast);
        self.notify.notify_waiters();
    }
}
