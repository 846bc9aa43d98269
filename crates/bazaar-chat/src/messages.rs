// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-thread message log: appends, live subscription, withdrawal, and
//! reactions.
//!
//! Every append goes through the same path: resolve the thread and the
//! recipient, consult the block guard, write the message, then apply the
//! preview and unread side effects to the thread in one atomic patch.
//! Validation failures and missing threads are silent no-ops that return
//! `Ok(None)`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use bazaar_config::model::ChatConfig;
use bazaar_core::document::child_collection;
use bazaar_core::{
    BazaarError, Direction, Document, DocumentStore, FieldPath, Message, MessageBody, MessageId,
    Patch, Query, Subscription, Thread, ThreadId, UploadService, UserId,
};

use crate::blocking::BlockGuard;
use crate::preview::{PHOTO_PREVIEW, WITHDRAWN_PREVIEW};
use crate::threads::{ignore_missing, to_fields, ThreadStore, MESSAGES, THREADS};

/// Default withdrawal window: three minutes.
pub const WITHDRAW_WINDOW_MS: u64 = 180_000;

/// True iff `created_at` is at most `window_ms` before `now`.
pub fn within_window(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>, window_ms: u64) -> bool {
    let Some(created_at) = created_at else {
        return false;
    };
    let window = i64::try_from(window_ms).unwrap_or(i64::MAX);
    (now - created_at).num_milliseconds() <= window
}

/// Whether a message created at `created_at` may still be withdrawn.
pub fn can_withdraw_message(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    within_window(created_at, now, WITHDRAW_WINDOW_MS)
}

/// Collection holding a thread's messages.
pub fn messages_collection(thread: &ThreadId) -> String {
    child_collection(THREADS, thread.as_str(), MESSAGES)
}

pub(crate) fn decode_message(doc: &Document) -> Result<Message, BazaarError> {
    let mut message: Message = doc.decode()?;
    message.id = MessageId(doc.id.clone());
    Ok(message)
}

/// A validated append target.
pub(crate) struct AppendTarget {
    pub(crate) thread: Thread,
    pub(crate) recipient: UserId,
}

/// The append-only message log of every thread.
#[derive(Clone)]
pub struct MessageLog {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) threads: ThreadStore,
    uploader: Arc<dyn UploadService>,
    guard: BlockGuard,
    config: ChatConfig,
}

impl MessageLog {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        uploader: Arc<dyn UploadService>,
        guard: BlockGuard,
        config: ChatConfig,
    ) -> Self {
        Self {
            threads: ThreadStore::new(store.clone()),
            store,
            uploader,
            guard,
            config,
        }
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    /// Looks up the thread and recipient and applies the block guard.
    ///
    /// `Ok(None)` when the thread is gone, the sender is not a participant,
    /// or an explicit recipient is not the sender's counterpart.
    pub(crate) async fn target(
        &self,
        thread_id: &ThreadId,
        sender: &UserId,
        recipient: Option<&UserId>,
    ) -> Result<Option<AppendTarget>, BazaarError> {
        let Some(thread) = self.threads.get(thread_id).await? else {
            debug!(thread_id = %thread_id, "append skipped: thread missing");
            return Ok(None);
        };
        let Some(other) = thread.participants.other(sender) else {
            debug!(thread_id = %thread_id, sender = %sender, "append skipped: sender not a participant");
            return Ok(None);
        };
        if let Some(r) = recipient.filter(|r| *r != other) {
            debug!(thread_id = %thread_id, recipient = %r, "append skipped: recipient is not the other participant");
            return Ok(None);
        }
        let recipient = other.clone();
        self.guard.ensure_can_message(sender, &recipient).await?;
        Ok(Some(AppendTarget { thread, recipient }))
    }

    /// Writes the message, then the thread side effects.
    pub(crate) async fn append(
        &self,
        target: AppendTarget,
        sender: &UserId,
        body: MessageBody,
        preview: &str,
    ) -> Result<MessageId, BazaarError> {
        let message = Message {
            id: MessageId::default(),
            sender_id: sender.clone(),
            created_at: None,
            body,
            withdrawn: false,
            reactions: BTreeMap::new(),
        };
        let mut fields = to_fields(&message)?;
        // The store assigns createdAt.
        fields.remove("createdAt");

        let thread_id = &target.thread.id;
        let id = self
            .store
            .append_child(THREADS, thread_id.as_str(), MESSAGES, fields)
            .await?;
        self.threads
            .record_append(thread_id, &target.recipient, preview)
            .await?;
        debug!(thread_id = %thread_id, message_id = %id, "message appended");
        Ok(MessageId(id))
    }

    /// Appends a text message. Blank or oversized text is ignored.
    pub async fn send_message(
        &self,
        thread_id: &ThreadId,
        sender: &UserId,
        text: &str,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        let text = text.trim();
        if text.is_empty() {
            debug!(thread_id = %thread_id, "send skipped: empty text");
            return Ok(None);
        }
        if text.chars().count() > self.config.max_text_len {
            debug!(thread_id = %thread_id, limit = self.config.max_text_len, "send skipped: text too long");
            return Ok(None);
        }
        let Some(target) = self.target(thread_id, sender, recipient).await? else {
            return Ok(None);
        };
        let body = MessageBody::Text {
            text: text.to_string(),
        };
        self.append(target, sender, body, text).await.map(Some)
    }

    /// Uploads the photo, then appends it. Upload failures append nothing.
    pub async fn send_photo(
        &self,
        thread_id: &ThreadId,
        sender: &UserId,
        local_ref: &str,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        let Some(target) = self.target(thread_id, sender, recipient).await? else {
            return Ok(None);
        };
        let photo_url = self.uploader.upload(local_ref).await?;
        let body = MessageBody::Photo { photo_url };
        self.append(target, sender, body, PHOTO_PREVIEW).await.map(Some)
    }

    pub async fn get_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, BazaarError> {
        self.store
            .get(&messages_collection(thread_id), message_id.as_str())
            .await?
            .map(|doc| decode_message(&doc))
            .transpose()
    }

    fn log_query(thread_id: &ThreadId) -> Query {
        Query::collection(messages_collection(thread_id)).order_by("createdAt", Direction::Ascending)
    }

    /// The full log in creation order.
    pub async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, BazaarError> {
        let docs = self.store.query(&Self::log_query(thread_id)).await?;
        docs.iter().map(decode_message).collect()
    }

    /// Live log in creation order; the callback receives the whole list on every change.
    pub fn subscribe_to_messages<F>(
        &self,
        thread_id: &ThreadId,
        callback: F,
    ) -> Result<Subscription, BazaarError>
    where
        F: Fn(Vec<Message>) + Send + Sync + 'static,
    {
        self.store.subscribe(
            Self::log_query(thread_id),
            Arc::new(move |docs: Vec<Document>| {
                let messages = docs
                    .iter()
                    .filter_map(|doc| match decode_message(doc) {
                        Ok(message) => Some(message),
                        Err(e) => {
                            warn!(message_id = %doc.id, error = %e, "skipping undecodable message");
                            None
                        }
                    })
                    .collect();
                callback(messages);
            }),
        )
    }

    pub async fn clear_unread(&self, thread_id: &ThreadId, user: &UserId) -> Result<(), BazaarError> {
        self.threads.clear_unread(thread_id, user).await
    }

    /// Sets `user`'s reaction, or removes it when it already equals `token`.
    pub async fn toggle_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        user: &UserId,
        token: &str,
    ) -> Result<(), BazaarError> {
        let Some(message) = self.get_message(thread_id, message_id).await? else {
            debug!(thread_id = %thread_id, message_id = %message_id, "reaction skipped: message missing");
            return Ok(());
        };
        let next = if message.reaction_of(user) == Some(token) {
            Value::Null
        } else {
            Value::String(token.to_string())
        };
        self.write_reaction(thread_id, message_id, user, next).await
    }

    pub async fn remove_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        user: &UserId,
    ) -> Result<(), BazaarError> {
        self.write_reaction(thread_id, message_id, user, Value::Null).await
    }

    async fn write_reaction(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        user: &UserId,
        value: Value,
    ) -> Result<(), BazaarError> {
        let patch = Patch::new().set(FieldPath::new(["reactions", user.as_str()]), value);
        ignore_missing(
            self.store
                .update(&messages_collection(thread_id), message_id.as_str(), patch)
                .await,
            "write reaction",
        )?;
        Ok(())
    }

    /// Whether `message` is still inside the configured withdrawal window.
    pub fn can_withdraw(&self, message: &Message) -> bool {
        within_window(
            message.created_at,
            self.store.server_now(),
            self.config.withdraw_window_ms,
        )
    }

    /// Destructively withdraws a message. Performs no ownership or window
    /// check; see [`withdraw_own_message`](Self::withdraw_own_message).
    ///
    /// Returns `false` if the message does not exist. Unread counters are
    /// left as they are.
    pub async fn withdraw_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<bool, BazaarError> {
        let patch = Patch::new()
            .set("withdrawn", true)
            .set("text", "")
            .set("photoUrl", "");
        let updated = ignore_missing(
            self.store
                .update(&messages_collection(thread_id), message_id.as_str(), patch)
                .await,
            "withdraw message",
        )?;
        if updated.is_none() {
            return Ok(false);
        }
        self.threads.set_last_message(thread_id, WITHDRAWN_PREVIEW).await?;
        info!(thread_id = %thread_id, message_id = %message_id, "message withdrawn");
        Ok(true)
    }

    /// Withdraws a message on behalf of `requester`, who must be its sender
    /// and still be inside the window.
    pub async fn withdraw_own_message(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        requester: &UserId,
    ) -> Result<bool, BazaarError> {
        let Some(message) = self.get_message(thread_id, message_id).await? else {
            return Ok(false);
        };
        if message.sender_id != *requester {
            return Err(BazaarError::NotMessageSender);
        }
        if !self.can_withdraw(&message) {
            return Err(BazaarError::WithdrawWindowExpired {
                window_ms: self.config.withdraw_window_ms,
            });
        }
        self.withdraw_message(thread_id, message_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use bazaar_core::ParticipantProfile;
    use bazaar_storage::SqliteStore;
    use bazaar_test_utils::{MockUploader, StaticBlockOracle};

    use crate::threads::ThreadContext;

    struct Fixture {
        store: Arc<SqliteStore>,
        uploader: Arc<MockUploader>,
        log: MessageLog,
        thread: ThreadId,
    }

    fn context() -> ThreadContext {
        ThreadContext {
            item_id: "bike".into(),
            item_name: "Road bike".into(),
            buyer_id: "buyer".into(),
            seller_id: "seller".into(),
            buyer: ParticipantProfile::new("Bea", None),
            seller: ParticipantProfile::new("Sam", None),
        }
    }

    async fn fixture_with(guard: BlockGuard, config: ChatConfig) -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let uploader = Arc::new(MockUploader::new());
        let log = MessageLog::new(store.clone(), uploader.clone(), guard, config);
        let thread = log.threads().get_or_create(&context()).await.unwrap();
        Fixture {
            store,
            uploader,
            log,
            thread,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(BlockGuard::disabled(), ChatConfig::default()).await
    }

    fn buyer() -> UserId {
        "buyer".into()
    }

    fn seller() -> UserId {
        "seller".into()
    }

    #[test]
    fn withdraw_window_boundaries() {
        let now = Utc::now();
        assert!(can_withdraw_message(Some(now - Duration::milliseconds(179_999)), now));
        assert!(can_withdraw_message(Some(now - Duration::milliseconds(180_000)), now));
        assert!(!can_withdraw_message(Some(now - Duration::milliseconds(180_001)), now));
        assert!(!can_withdraw_message(None, now));
    }

    #[tokio::test]
    async fn text_append_updates_log_and_thread() {
        let f = fixture().await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "  is it available?  ", None)
            .await
            .unwrap()
            .unwrap();

        let log = f.log.list_messages(&f.thread).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, id);
        assert_eq!(log[0].text(), Some("is it available?"));
        assert!(!log[0].withdrawn);
        assert!(log[0].created_at.is_some());

        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, "is it available?");
        assert_eq!(thread.unread_for(&seller()), 1);
        assert_eq!(thread.unread_for(&buyer()), 0);
    }

    #[tokio::test]
    async fn blank_text_changes_nothing() {
        let f = fixture().await;
        let before = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert!(f.log.send_message(&f.thread, &buyer(), " \n\t", None).await.unwrap().is_none());
        assert!(f.log.list_messages(&f.thread).await.unwrap().is_empty());
        assert_eq!(f.log.threads().get(&f.thread).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn oversized_text_is_ignored() {
        let config = ChatConfig {
            max_text_len: 5,
            ..ChatConfig::default()
        };
        let f = fixture_with(BlockGuard::disabled(), config).await;
        assert!(f.log.send_message(&f.thread, &buyer(), "123456", None).await.unwrap().is_none());
        assert!(f.log.send_message(&f.thread, &buyer(), "12345", None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_thread_is_silent() {
        let f = fixture().await;
        let ghost = ThreadId::from("a_b_c");
        assert!(f.log.send_message(&ghost, &buyer(), "hi", None).await.unwrap().is_none());
        assert!(f.log.send_photo(&ghost, &buyer(), "/tmp/x.jpg", None).await.unwrap().is_none());
        assert_eq!(f.uploader.upload_count(), 0);
    }

    #[tokio::test]
    async fn explicit_recipient_is_honored() {
        let f = fixture().await;
        f.log
            .send_message(&f.thread, &seller(), "hello", Some(&buyer()))
            .await
            .unwrap()
            .unwrap();
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.unread_for(&buyer()), 1);
        assert_eq!(thread.unread_for(&seller()), 0);
    }

    #[tokio::test]
    async fn non_participants_cannot_append() {
        let f = fixture().await;
        let stranger = UserId::from("stranger");
        assert!(f.log.send_message(&f.thread, &stranger, "hi", None).await.unwrap().is_none());
        assert!(f
            .log
            .send_message(&f.thread, &buyer(), "hi", Some(&stranger))
            .await
            .unwrap()
            .is_none());
        assert!(f
            .log
            .send_offer(&f.thread, &seller(), 10.0, Some(&seller()))
            .await
            .unwrap()
            .is_none());
        assert!(f
            .log
            .send_photo(&f.thread, &stranger, "/p.jpg", None)
            .await
            .unwrap()
            .is_none());

        assert!(f.log.list_messages(&f.thread).await.unwrap().is_empty());
        assert_eq!(f.uploader.upload_count(), 0);
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, "");
        assert!(!thread.unread.contains_key("stranger"));
        assert_eq!(thread.unread_for(&seller()), 0);
    }

    #[tokio::test]
    async fn photo_append_uses_uploaded_url() {
        let f = fixture().await;
        f.log
            .send_photo(&f.thread, &seller(), "/photos/bike.jpg", None)
            .await
            .unwrap()
            .unwrap();

        let log = f.log.list_messages(&f.thread).await.unwrap();
        assert_eq!(log[0].photo_url(), Some("mock://uploads/bike.jpg"));
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, PHOTO_PREVIEW);
        assert_eq!(thread.unread_for(&buyer()), 1);
    }

    #[tokio::test]
    async fn failed_upload_appends_nothing() {
        let f = fixture().await;
        f.uploader.fail_next("network down");
        let err = f
            .log
            .send_photo(&f.thread, &seller(), "/photos/bike.jpg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Upload { .. }));
        assert!(f.log.list_messages(&f.thread).await.unwrap().is_empty());
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, "");
        assert_eq!(thread.unread_for(&buyer()), 0);
    }

    #[tokio::test]
    async fn blocked_sender_cannot_append() {
        let oracle = StaticBlockOracle::new();
        oracle.block(&seller(), &buyer());
        let f = fixture_with(BlockGuard::new(Arc::new(oracle)), ChatConfig::default()).await;

        let err = f
            .log
            .send_message(&f.thread, &buyer(), "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Blocked { blocked_by_other: true, .. }));
        let err = f
            .log
            .send_photo(&f.thread, &buyer(), "/p.jpg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::Blocked { .. }));
        assert_eq!(f.uploader.upload_count(), 0);
    }

    #[tokio::test]
    async fn withdrawal_clears_content_but_not_unread() {
        let f = fixture().await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "oops", None)
            .await
            .unwrap()
            .unwrap();
        assert!(f.log.withdraw_message(&f.thread, &id).await.unwrap());

        let message = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert!(message.withdrawn);
        assert_eq!(message.text(), Some(""));
        let doc = f
            .store
            .get(&messages_collection(&f.thread), id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["photoUrl"], Value::String(String::new()));

        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, WITHDRAWN_PREVIEW);
        assert_eq!(thread.unread_for(&seller()), 1);
    }

    #[tokio::test]
    async fn withdrawn_photo_loses_its_url() {
        let f = fixture().await;
        let id = f
            .log
            .send_photo(&f.thread, &seller(), "/photos/bike.jpg", None)
            .await
            .unwrap()
            .unwrap();
        assert!(f.log.withdraw_message(&f.thread, &id).await.unwrap());

        let message = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert!(message.withdrawn);
        assert_eq!(message.photo_url(), Some(""));
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, WITHDRAWN_PREVIEW);
    }

    #[tokio::test]
    async fn withdrawing_missing_message_is_noop() {
        let f = fixture().await;
        assert!(!f.log.withdraw_message(&f.thread, &"nope".into()).await.unwrap());
        let thread = f.log.threads().get(&f.thread).await.unwrap().unwrap();
        assert_eq!(thread.last_message, "");
    }

    #[tokio::test]
    async fn only_sender_may_withdraw_own_message() {
        let f = fixture().await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "mine", None)
            .await
            .unwrap()
            .unwrap();
        let err = f
            .log
            .withdraw_own_message(&f.thread, &id, &seller())
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::NotMessageSender));
        assert!(f.log.withdraw_own_message(&f.thread, &id, &buyer()).await.unwrap());
    }

    #[tokio::test]
    async fn expired_window_rejects_withdrawal() {
        let config = ChatConfig {
            withdraw_window_ms: 0,
            ..ChatConfig::default()
        };
        let f = fixture_with(BlockGuard::disabled(), config).await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "late", None)
            .await
            .unwrap()
            .unwrap();
        // The store clock is strictly monotonic, so "now" is already past createdAt.
        let err = f
            .log
            .withdraw_own_message(&f.thread, &id, &buyer())
            .await
            .unwrap_err();
        assert!(matches!(err, BazaarError::WithdrawWindowExpired { window_ms: 0 }));
        assert!(err.is_user_facing());
    }

    #[tokio::test]
    async fn reactions_toggle_per_user() {
        let f = fixture().await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "deal?", None)
            .await
            .unwrap()
            .unwrap();

        f.log.toggle_reaction(&f.thread, &id, &seller(), "👍").await.unwrap();
        f.log.toggle_reaction(&f.thread, &id, &buyer(), "❤️").await.unwrap();
        let m = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert_eq!(m.reaction_of(&seller()), Some("👍"));
        assert_eq!(m.reaction_of(&buyer()), Some("❤️"));

        f.log.toggle_reaction(&f.thread, &id, &seller(), "👍").await.unwrap();
        let m = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert_eq!(m.reaction_of(&seller()), None);
        assert!(m.reactions.contains_key("seller"));

        f.log.toggle_reaction(&f.thread, &id, &buyer(), "😂").await.unwrap();
        f.log.remove_reaction(&f.thread, &id, &seller()).await.unwrap();
        let m = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert_eq!(m.reaction_of(&buyer()), Some("😂"));
    }

    #[tokio::test]
    async fn user_ids_with_dots_stay_flat() {
        let f = fixture().await;
        let id = f
            .log
            .send_message(&f.thread, &buyer(), "hi", None)
            .await
            .unwrap()
            .unwrap();
        let dotted = UserId::from("first.last");
        f.log.toggle_reaction(&f.thread, &id, &dotted, "👀").await.unwrap();
        let m = f.log.get_message(&f.thread, &id).await.unwrap().unwrap();
        assert_eq!(m.reaction_of(&dotted), Some("👀"));
    }

    #[tokio::test]
    async fn subscription_delivers_in_creation_order() {
        let f = fixture().await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sub = f
            .log
            .subscribe_to_messages(&f.thread, move |messages| {
                let _ = tx.send(messages);
            })
            .unwrap();
        assert!(rx.recv().await.unwrap().is_empty());

        for text in ["one", "two", "three"] {
            f.log.send_message(&f.thread, &buyer(), text, None).await.unwrap();
        }
        let mut latest = Vec::new();
        while latest.len() < 3 {
            latest = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
        }
        let texts: Vec<_> = latest.iter().filter_map(|m| m.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        sub.unsubscribe();
    }

    #[tokio::test]
    async fn subscription_reemits_in_order_after_mutation() {
        let f = fixture().await;
        let mut ids = Vec::new();
        for text in ["first", "second"] {
            let id = f
                .log
                .send_message(&f.thread, &buyer(), text, None)
                .await
                .unwrap()
                .unwrap();
            ids.push(id);
        }

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sub = f
            .log
            .subscribe_to_messages(&f.thread, move |messages| {
                let _ = tx.send(messages);
            })
            .unwrap();
        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.len(), 2);

        f.log.toggle_reaction(&f.thread, &ids[0], &seller(), "👍").await.unwrap();
        f.log.withdraw_message(&f.thread, &ids[0]).await.unwrap();

        let mut latest = initial;
        while !latest.first().is_some_and(|m| m.withdrawn) {
            latest = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
        }
        let order: Vec<_> = latest.iter().map(|m| m.id.clone()).collect();
        assert_eq!(order, ids);
        assert_eq!(latest[0].reaction_of(&seller()), Some("👍"));
        assert_eq!(latest[0].text(), Some(""));
        assert_eq!(latest[1].text(), Some("second"));
        sub.unsubscribe();
    }
}
