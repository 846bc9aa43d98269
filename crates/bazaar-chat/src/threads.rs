// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread store adapter: get-or-create, metadata patches, and thread-list
//! subscriptions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use bazaar_core::{
    AcceptedOffer, BazaarError, Direction, Document, DocumentStore, FieldPath, Fields, Filter,
    ItemId, ParticipantProfile, Participants, Patch, Query, Subscription, Thread, ThreadId,
    ThreadSummary, UserId,
};

use crate::preview;
use crate::thread_id::thread_id_for;

pub const THREADS: &str = "threads";
pub const MESSAGES: &str = "messages";
pub const LISTINGS: &str = "listings";

/// Who is talking about which listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadContext {
    pub item_id: ItemId,
    pub item_name: String,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub buyer: ParticipantProfile,
    pub seller: ParticipantProfile,
}

impl ThreadContext {
    pub fn thread_id(&self) -> ThreadId {
        thread_id_for(&self.buyer_id, &self.seller_id, &self.item_id)
    }
}

/// Serializes a domain value into a document field map.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields, BazaarError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(BazaarError::Internal(format!(
            "expected an object, serialized to {other}"
        ))),
        Err(e) => Err(BazaarError::Internal(format!("serialization failed: {e}"))),
    }
}

/// Decodes a thread document, keeping its id.
pub(crate) fn decode_thread(doc: &Document) -> Result<Thread, BazaarError> {
    let mut thread: Thread = doc.decode()?;
    thread.id = ThreadId(doc.id.clone());
    Ok(thread)
}

/// Swallows `NotFound`: writes racing a missing thread are benign.
pub(crate) fn ignore_missing<T>(
    result: Result<T, BazaarError>,
    what: &str,
) -> Result<Option<T>, BazaarError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            debug!(error = %e, "{what}: target missing, skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// CRUD over thread documents.
#[derive(Clone)]
pub struct ThreadStore {
    store: Arc<dyn DocumentStore>,
}

impl ThreadStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the id of the thread for `ctx`, creating it on first contact.
    ///
    /// Safe to race: exactly one caller creates the document, every other
    /// caller refreshes item metadata on the existing one.
    pub async fn get_or_create(&self, ctx: &ThreadContext) -> Result<ThreadId, BazaarError> {
        let id = ctx.thread_id();
        let thread = Thread {
            id: id.clone(),
            item_id: ctx.item_id.clone(),
            item_name: ctx.item_name.clone(),
            participants: Participants {
                buyer_id: ctx.buyer_id.clone(),
                seller_id: ctx.seller_id.clone(),
            },
            participant_ids: vec![ctx.buyer_id.clone(), ctx.seller_id.clone()],
            buyer: ctx.buyer.clone(),
            seller: ctx.seller.clone(),
            last_message: String::new(),
            timestamp: self.store.server_now(),
            unread: BTreeMap::from([
                (ctx.buyer_id.to_string(), 0),
                (ctx.seller_id.to_string(), 0),
            ]),
            accepted_offer: None,
        };

        if self
            .store
            .create_if_absent(THREADS, id.as_str(), to_fields(&thread)?)
            .await?
        {
            info!(thread_id = %id, item_id = %ctx.item_id, "thread created");
            self.bump_listing_message_count(&ctx.item_id).await;
            return Ok(id);
        }

        self.refresh(&id, ctx).await?;
        Ok(id)
    }

    /// Re-stamps listing details on an existing thread. A thread deleted
    /// since the create attempt is skipped, never recreated.
    async fn refresh(&self, id: &ThreadId, ctx: &ThreadContext) -> Result<(), BazaarError> {
        let patch = Patch::new()
            .set("itemId", ctx.item_id.as_str())
            .set("itemName", ctx.item_name.as_str())
            .server_timestamp("timestamp");
        if ignore_missing(self.store.update(THREADS, id.as_str(), patch).await, "refresh thread")?
            .is_some()
        {
            debug!(thread_id = %id, "existing thread refreshed");
        }
        Ok(())
    }

    /// Best-effort analytics counter on the listing.
    async fn bump_listing_message_count(&self, item_id: &ItemId) {
        let patch = Patch::new().increment("messagesCount", 1);
        if let Err(e) = self.store.update(LISTINGS, item_id.as_str(), patch).await {
            warn!(item_id = %item_id, error = %e, "listing message count not updated");
        }
    }

    pub async fn get(&self, id: &ThreadId) -> Result<Option<Thread>, BazaarError> {
        self.store
            .get(THREADS, id.as_str())
            .await?
            .map(|doc| decode_thread(&doc))
            .transpose()
    }

    /// Applies the side effects of one log append: preview, recipient
    /// unread, and activity timestamp, in a single atomic patch.
    pub async fn record_append(
        &self,
        id: &ThreadId,
        recipient: &UserId,
        preview: &str,
    ) -> Result<(), BazaarError> {
        let patch = Patch::new()
            .set("lastMessage", preview)
            .increment(FieldPath::new(["unread", recipient.as_str()]), 1)
            .server_timestamp("timestamp");
        ignore_missing(self.store.update(THREADS, id.as_str(), patch).await, "record append")?;
        Ok(())
    }

    pub async fn set_last_message(&self, id: &ThreadId, preview: &str) -> Result<(), BazaarError> {
        let patch = Patch::new().set("lastMessage", preview);
        ignore_missing(
            self.store.update(THREADS, id.as_str(), patch).await,
            "set last message",
        )?;
        Ok(())
    }

    /// Zeroes `user`'s unread counter.
    pub async fn clear_unread(&self, id: &ThreadId, user: &UserId) -> Result<(), BazaarError> {
        let patch = Patch::new().set(FieldPath::new(["unread", user.as_str()]), 0);
        ignore_missing(self.store.update(THREADS, id.as_str(), patch).await, "clear unread")?;
        Ok(())
    }

    /// Denormalizes an accepted offer onto the thread.
    pub async fn record_accepted_offer(
        &self,
        id: &ThreadId,
        offer: &AcceptedOffer,
    ) -> Result<(), BazaarError> {
        let value = serde_json::to_value(offer)
            .map_err(|e| BazaarError::Internal(format!("serialization failed: {e}")))?;
        let patch = Patch::new()
            .set("acceptedOffer", value)
            .set("lastMessage", preview::accepted_offer_preview(offer.amount));
        self.store.update(THREADS, id.as_str(), patch).await?;
        Ok(())
    }

    /// Live thread list for `user`, most recent activity first.
    pub fn subscribe_summaries<F>(&self, user: &UserId, callback: F) -> Result<Subscription, BazaarError>
    where
        F: Fn(Vec<ThreadSummary>) + Send + Sync + 'static,
    {
        let query = Query::collection(THREADS)
            .filter(Filter::ArrayContains(
                "participantIds".into(),
                Value::String(user.to_string()),
            ))
            .order_by("timestamp", Direction::Descending);
        let viewer = user.clone();
        self.store.subscribe(
            query,
            Arc::new(move |docs: Vec<Document>| {
                let summaries = docs
                    .iter()
                    .filter_map(|doc| match decode_thread(doc) {
                        Ok(thread) => preview::summarize(&thread, &viewer),
                        Err(e) => {
                            warn!(thread_id = %doc.id, error = %e, "skipping undecodable thread");
                            None
                        }
                    })
                    .collect();
                callback(summaries);
            }),
        )
    }
}
