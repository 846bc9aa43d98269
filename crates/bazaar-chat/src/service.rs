// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ChatService` facade wiring the thread store, message log, preferences,
//! and notification detector over one document store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bazaar_config::model::{ChatConfig, NotificationConfig};
use bazaar_config::BazaarConfig;
use bazaar_core::{
    BazaarError, BlockOracle, BlockStatus, DocumentStore, Message, MessageId, NotificationSink,
    Subscription, Thread, ThreadId, ThreadSummary, UploadService, UserId,
};

use crate::blocking::BlockGuard;
use crate::messages::{within_window, MessageLog};
use crate::notify::NotificationDetector;
use crate::preferences::PreferenceStore;
use crate::threads::{ThreadContext, ThreadStore};

/// Text sent after a decline so the other side sees it in the thread list.
pub const OFFER_DECLINED_NOTICE: &str = "Offer declined";

/// Builder for [`ChatService`].
pub struct ChatServiceBuilder {
    store: Arc<dyn DocumentStore>,
    uploader: Arc<dyn UploadService>,
    oracle: Option<Arc<dyn BlockOracle>>,
    chat: ChatConfig,
    notifications: NotificationConfig,
}

impl ChatServiceBuilder {
    /// Enables blocking enforcement through `oracle`.
    pub fn with_block_oracle(mut self, oracle: Arc<dyn BlockOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_chat_config(mut self, chat: ChatConfig) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_notification_config(mut self, notifications: NotificationConfig) -> Self {
        self.notifications = notifications;
        self
    }

    /// Takes the `[chat]` and `[notifications]` sections.
    pub fn with_config(self, config: &BazaarConfig) -> Self {
        self.with_chat_config(config.chat.clone())
            .with_notification_config(config.notifications.clone())
    }

    pub fn build(self) -> ChatService {
        let guard = BlockGuard::from_config(self.oracle, &self.chat);
        let messages = MessageLog::new(
            self.store.clone(),
            self.uploader,
            guard.clone(),
            self.chat.clone(),
        );
        ChatService {
            threads: messages.threads().clone(),
            preferences: PreferenceStore::new(
                self.store.clone(),
                self.notifications.default_enabled,
            ),
            messages,
            guard,
            store: self.store,
            chat: self.chat,
            notifications: self.notifications,
        }
    }
}

/// Marketplace chat operations for one document store.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    threads: ThreadStore,
    messages: MessageLog,
    preferences: PreferenceStore,
    guard: BlockGuard,
    chat: ChatConfig,
    notifications: NotificationConfig,
}

impl ChatService {
    pub fn builder(
        store: Arc<dyn DocumentStore>,
        uploader: Arc<dyn UploadService>,
    ) -> ChatServiceBuilder {
        ChatServiceBuilder {
            store,
            uploader,
            oracle: None,
            chat: ChatConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn get_or_create_thread(&self, ctx: &ThreadContext) -> Result<ThreadId, BazaarError> {
        self.threads.get_or_create(ctx).await
    }

    pub async fn thread(&self, id: &ThreadId) -> Result<Option<Thread>, BazaarError> {
        self.threads.get(id).await
    }

    pub async fn send_message(
        &self,
        thread: &ThreadId,
        sender: &UserId,
        text: &str,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        self.messages.send_message(thread, sender, text, recipient).await
    }

    pub async fn send_photo(
        &self,
        thread: &ThreadId,
        sender: &UserId,
        local_ref: &str,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        self.messages.send_photo(thread, sender, local_ref, recipient).await
    }

    pub async fn send_offer(
        &self,
        thread: &ThreadId,
        sender: &UserId,
        amount: f64,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        self.messages.send_offer(thread, sender, amount, recipient).await
    }

    pub async fn accept_offer(
        &self,
        thread: &ThreadId,
        message: &MessageId,
        buyer: &UserId,
        amount: f64,
    ) -> Result<bool, BazaarError> {
        self.messages.accept_offer(thread, message, buyer, amount).await
    }

    pub async fn decline_offer(
        &self,
        thread: &ThreadId,
        message: &MessageId,
    ) -> Result<bool, BazaarError> {
        self.messages.decline_offer(thread, message).await
    }

    /// Declines, then posts a visible "Offer declined" text from `decliner`.
    pub async fn decline_offer_with_notice(
        &self,
        thread: &ThreadId,
        message: &MessageId,
        decliner: &UserId,
    ) -> Result<bool, BazaarError> {
        if !self.messages.decline_offer(thread, message).await? {
            return Ok(false);
        }
        self.messages
            .send_message(thread, decliner, OFFER_DECLINED_NOTICE, None)
            .await?;
        Ok(true)
    }

    pub async fn clear_unread(&self, thread: &ThreadId, user: &UserId) -> Result<(), BazaarError> {
        self.messages.clear_unread(thread, user).await
    }

    pub async fn toggle_reaction(
        &self,
        thread: &ThreadId,
        message: &MessageId,
        user: &UserId,
        token: &str,
    ) -> Result<(), BazaarError> {
        self.messages.toggle_reaction(thread, message, user, token).await
    }

    pub async fn remove_reaction(
        &self,
        thread: &ThreadId,
        message: &MessageId,
        user: &UserId,
    ) -> Result<(), BazaarError> {
        self.messages.remove_reaction(thread, message, user).await
    }

    /// Uses the configured window rather than the three-minute default.
    pub fn can_withdraw_message(&self, created_at: Option<DateTime<Utc>>) -> bool {
        within_window(created_at, self.store.server_now(), self.chat.withdraw_window_ms)
    }

    pub async fn withdraw_message(
        &self,
        thread: &ThreadId,
        message: &MessageId,
    ) -> Result<bool, BazaarError> {
        self.messages.withdraw_message(thread, message).await
    }

    pub async fn withdraw_own_message(
        &self,
        thread: &ThreadId,
        message: &MessageId,
        requester: &UserId,
    ) -> Result<bool, BazaarError> {
        self.messages
            .withdraw_own_message(thread, message, requester)
            .await
    }

    pub fn subscribe_to_messages<F>(
        &self,
        thread: &ThreadId,
        callback: F,
    ) -> Result<Subscription, BazaarError>
    where
        F: Fn(Vec<Message>) + Send + Sync + 'static,
    {
        self.messages.subscribe_to_messages(thread, callback)
    }

    pub fn subscribe_to_threads<F>(
        &self,
        user: &UserId,
        callback: F,
    ) -> Result<Subscription, BazaarError>
    where
        F: Fn(Vec<ThreadSummary>) + Send + Sync + 'static,
    {
        self.threads.subscribe_summaries(user, callback)
    }

    /// Blocking status between `user` and `other`; all clear when enforcement is off.
    pub async fn block_status(
        &self,
        user: &UserId,
        other: &UserId,
    ) -> Result<BlockStatus, BazaarError> {
        self.guard.status(user, other).await
    }

    pub async fn notifications_enabled(&self, user: &UserId) -> Result<bool, BazaarError> {
        self.preferences.notifications_enabled(user).await
    }

    pub async fn set_notifications_enabled(
        &self,
        user: &UserId,
        enabled: bool,
    ) -> Result<(), BazaarError> {
        self.preferences.set_notifications_enabled(user, enabled).await
    }

    /// Starts a detector delivering toasts to `sink`. Call `set_user` on it to begin.
    pub fn notification_detector(
        &self,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<NotificationDetector, BazaarError> {
        NotificationDetector::spawn(
            self.threads.clone(),
            self.preferences.clone(),
            sink,
            &self.notifications,
        )
    }
}
