// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store trait with live queries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::document::{Document, Fields, Patch, Query, UpdateOutcome};
use crate::error::BazaarError;
use crate::traits::adapter::Adapter;

/// Receives the full ordered result set of a live query on every change.
pub type SnapshotCallback = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Cancellation handle for a live query.
///
/// Dropping the handle cancels the subscription, so store-side listeners
/// never outlive their consumer.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn unsubscribe(self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Adapter for the document store backing threads, messages, and preferences.
#[async_trait]
pub trait DocumentStore: Adapter {
    /// Fetches one document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BazaarError>;

    /// Runs a one-shot query.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, BazaarError>;

    /// Atomically creates the document unless it exists.
    ///
    /// Returns `true` only for the caller that created it.
    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<bool, BazaarError>;

    /// Applies a patch atomically. A missing document is [`BazaarError::NotFound`].
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Patch,
    ) -> Result<UpdateOutcome, BazaarError>;

    /// Appends a child document with a fresh id and a server `createdAt`.
    async fn append_child(
        &self,
        parent_collection: &str,
        parent_id: &str,
        sub: &str,
        fields: Fields,
    ) -> Result<String, BazaarError>;

    /// Starts a live query. The callback runs once with the current result
    /// set and again after every change to it.
    fn subscribe(
        &self,
        query: Query,
        callback: SnapshotCallback,
    ) -> Result<Subscription, BazaarError>;

    /// Store-assigned timestamp, strictly increasing across calls.
    fn server_now(&self) -> DateTime<Utc>;
}
