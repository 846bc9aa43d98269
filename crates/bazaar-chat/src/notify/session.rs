// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread diffing state for one thread-list subscription.

use std::collections::HashMap;

use bazaar_core::{ThreadId, ThreadSummary, Toast};

/// Baseline of unread counters, seeded by the first snapshot.
///
/// The first call to [`observe`](Self::observe) after construction or
/// [`reset`](Self::reset) only records counters. Later calls emit one toast
/// per thread whose unread counter grew and whose preview is non-empty.
#[derive(Debug, Clone)]
pub struct NotificationSession {
    hydrated: bool,
    previous: HashMap<ThreadId, u32>,
    fallback_title: String,
}

impl NotificationSession {
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            hydrated: false,
            previous: HashMap::new(),
            fallback_title: fallback_title.into(),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Forgets the baseline; the next snapshot hydrates again.
    pub fn reset(&mut self) {
        self.hydrated = false;
        self.previous.clear();
    }

    pub fn observe(&mut self, snapshot: &[ThreadSummary]) -> Vec<Toast> {
        let mut toasts = Vec::new();
        for summary in snapshot {
            let previous = self
                .previous
                .insert(summary.thread_id.clone(), summary.unread)
                .unwrap_or(0);
            if !self.hydrated {
                continue;
            }
            if summary.unread > previous && !summary.preview.is_empty() {
                toasts.push(self.toast_for(summary));
            }
        }
        self.hydrated = true;
        toasts
    }

    fn toast_for(&self, summary: &ThreadSummary) -> Toast {
        let title = if summary.partner_name.trim().is_empty() {
            self.fallback_title.clone()
        } else {
            format!("New message from {}", summary.partner_name)
        };
        Toast {
            title,
            message: summary.preview.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(id: &str, partner: &str, unread: u32, preview: &str) -> ThreadSummary {
        ThreadSummary {
            thread_id: id.into(),
            item_id: "item".into(),
            item_name: "Item".into(),
            partner_id: "p".into(),
            partner_name: partner.to_string(),
            partner_initials: "P".into(),
            preview: preview.to_string(),
            timestamp: Utc::now(),
            unread,
            accepted_offer: None,
        }
    }

    #[test]
    fn hydration_snapshot_never_notifies() {
        let mut session = NotificationSession::new("New message");
        let toasts = session.observe(&[summary("t1", "Sam", 5, "hello")]);
        assert!(toasts.is_empty());
        assert!(session.is_hydrated());
    }

    #[test]
    fn growth_after_hydration_notifies_once() {
        let mut session = NotificationSession::new("New message");
        session.observe(&[summary("t1", "Sam", 1, "hello")]);

        let toasts = session.observe(&[summary("t1", "Sam", 2, "are you there?")]);
        assert_eq!(
            toasts,
            vec![Toast {
                title: "New message from Sam".into(),
                message: "are you there?".into(),
            }]
        );

        // Same counter again: nothing new.
        assert!(session.observe(&[summary("t1", "Sam", 2, "are you there?")]).is_empty());
    }

    #[test]
    fn cleared_counter_lowers_baseline() {
        let mut session = NotificationSession::new("New message");
        session.observe(&[summary("t1", "Sam", 3, "x")]);
        assert!(session.observe(&[summary("t1", "Sam", 0, "x")]).is_empty());
        assert_eq!(session.observe(&[summary("t1", "Sam", 1, "y")]).len(), 1);
    }

    #[test]
    fn empty_preview_is_silent_but_recorded() {
        let mut session = NotificationSession::new("New message");
        session.observe(&[summary("t1", "Sam", 0, "")]);
        assert!(session.observe(&[summary("t1", "Sam", 1, "")]).is_empty());
        // Baseline moved to 1 even though nothing fired.
        assert!(session.observe(&[summary("t1", "Sam", 1, "late preview")]).is_empty());
    }

    #[test]
    fn new_thread_after_hydration_notifies() {
        let mut session = NotificationSession::new("New message");
        session.observe(&[]);
        let toasts = session.observe(&[summary("t2", "", 1, "[Photo]")]);
        assert_eq!(toasts[0].title, "New message");
        assert_eq!(toasts[0].message, "[Photo]");
    }

    #[test]
    fn reset_rehydrates() {
        let mut session = NotificationSession::new("New message");
        session.observe(&[summary("t1", "Sam", 1, "a")]);
        session.reset();
        assert!(!session.is_hydrated());
        assert!(session.observe(&[summary("t1", "Sam", 9, "b")]).is_empty());
    }
}
