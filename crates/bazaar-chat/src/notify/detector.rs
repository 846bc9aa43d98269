// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! New-message detector for the signed-in user.
//!
//! One background task owns all detector state. Store callbacks only forward
//! events into its channel, tagged with the generation of the subscription
//! that produced them, so emissions from a torn-down subscription are
//! dropped instead of corrupting the baseline.
//!
//! Lifecycle per user:
//! - preference subscription starts as soon as a user is set
//! - thread subscription exists only while the preference is enabled
//! - disabling drops the thread subscription and resets the session
//! - switching users resets everything

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use bazaar_config::model::NotificationConfig;
use bazaar_core::{BazaarError, NotificationSink, Subscription, ThreadSummary, UserId};

use crate::notify::session::NotificationSession;
use crate::preferences::PreferenceStore;
use crate::threads::ThreadStore;

/// Observable detector state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorStatus {
    pub user: Option<UserId>,
    /// A thread subscription is live.
    pub enabled: bool,
    /// The live thread subscription has delivered its baseline.
    pub hydrated: bool,
}

enum Event {
    SetUser(Option<UserId>),
    Preference { generation: u64, enabled: bool },
    Threads { generation: u64, summaries: Vec<ThreadSummary> },
    Shutdown,
}

/// Handle to the detector task. Dropping it stops the task and releases
/// every store subscription it holds.
pub struct NotificationDetector {
    events: mpsc::UnboundedSender<Event>,
    status: watch::Receiver<DetectorStatus>,
}

impl NotificationDetector {
    /// Starts the detector task on the current tokio runtime.
    pub fn spawn(
        threads: ThreadStore,
        preferences: PreferenceStore,
        sink: Arc<dyn NotificationSink>,
        config: &NotificationConfig,
    ) -> Result<Self, BazaarError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            BazaarError::Internal(format!("notification detector needs a tokio runtime: {e}"))
        })?;
        let (events, inbox) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(DetectorStatus::default());

        let state = DetectorState {
            threads,
            preferences,
            sink,
            events: events.clone(),
            status: status_tx,
            user: None,
            user_generation: 0,
            thread_generation: 0,
            preference_sub: None,
            thread_sub: None,
            session: NotificationSession::new(config.fallback_title.clone()),
        };
        runtime.spawn(state.run(inbox));

        Ok(Self { events, status })
    }

    /// Switches the signed-in user; `None` signs out.
    pub fn set_user(&self, user: Option<UserId>) {
        let _ = self.events.send(Event::SetUser(user));
    }

    pub fn status(&self) -> DetectorStatus {
        self.status.borrow().clone()
    }

    /// Waits until the detector state satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> DetectorStatus
    where
        F: FnMut(&DetectorStatus) -> bool,
    {
        let mut status = self.status.clone();
        if let Ok(current) = status.wait_for(predicate).await {
            return current.clone();
        }
        // Task gone; report the last state it published.
        status.borrow().clone()
    }
}

impl Drop for NotificationDetector {
    fn drop(&mut self) {
        let _ = self.events.send(Event::Shutdown);
    }
}

struct DetectorState {
    threads: ThreadStore,
    preferences: PreferenceStore,
    sink: Arc<dyn NotificationSink>,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Sender<DetectorStatus>,
    user: Option<UserId>,
    user_generation: u64,
    thread_generation: u64,
    preference_sub: Option<Subscription>,
    thread_sub: Option<Subscription>,
    session: NotificationSession,
}

impl DetectorState {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = inbox.recv().await {
            match event {
                Event::SetUser(user) => self.set_user(user),
                Event::Preference {
                    generation,
                    enabled,
                } => {
                    if generation == self.user_generation {
                        self.apply_preference(enabled);
                    }
                }
                Event::Threads {
                    generation,
                    summaries,
                } => {
                    if generation == self.thread_generation && self.thread_sub.is_some() {
                        self.observe(&summaries);
                    } else {
                        debug!(generation, "stale thread snapshot dropped");
                    }
                }
                Event::Shutdown => break,
            }
            self.publish_status();
        }
        debug!("notification detector stopped");
    }

    fn set_user(&mut self, user: Option<UserId>) {
        if user == self.user {
            return;
        }
        self.stop_threads();
        self.preference_sub = None;
        self.user_generation += 1;
        self.user = user;

        let Some(user) = self.user.clone() else {
            debug!("notification detector signed out");
            return;
        };
        let generation = self.user_generation;
        let events = self.events.clone();
        match self.preferences.subscribe(&user, move |enabled| {
            let _ = events.send(Event::Preference {
                generation,
                enabled,
            });
        }) {
            Ok(sub) => {
                info!(user = %user, "notification detector watching user");
                self.preference_sub = Some(sub);
            }
            Err(e) => warn!(user = %user, error = %e, "notification preference subscription failed"),
        }
    }

    fn apply_preference(&mut self, enabled: bool) {
        match (enabled, self.thread_sub.is_some()) {
            (true, false) => self.start_threads(),
            (false, true) => {
                self.stop_threads();
                debug!("notifications disabled");
            }
            _ => {}
        }
    }

    fn start_threads(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };
        self.thread_generation += 1;
        self.session.reset();
        let generation = self.thread_generation;
        let events = self.events.clone();
        match self.threads.subscribe_summaries(&user, move |summaries| {
            let _ = events.send(Event::Threads {
                generation,
                summaries,
            });
        }) {
            Ok(sub) => self.thread_sub = Some(sub),
            Err(e) => warn!(user = %user, error = %e, "thread subscription failed"),
        }
    }

    fn stop_threads(&mut self) {
        self.thread_sub = None;
        self.thread_generation += 1;
        self.session.reset();
    }

    fn observe(&mut self, summaries: &[ThreadSummary]) {
        for toast in self.session.observe(summaries) {
            debug!(title = %toast.title, "new message notification");
            self.sink.show_toast(toast);
        }
    }

    fn publish_status(&self) {
        let next = DetectorStatus {
            user: self.user.clone(),
            enabled: self.thread_sub.is_some(),
            hydrated: self.thread_sub.is_some() && self.session.is_hydrated(),
        };
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
