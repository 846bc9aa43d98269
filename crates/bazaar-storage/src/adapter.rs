// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the DocumentStore trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use bazaar_config::model::StorageConfig;
use bazaar_core::document::child_collection;
use bazaar_core::{
    Adapter, AdapterType, BazaarError, Document, DocumentStore, Fields, HealthStatus, Patch,
    Query, SnapshotCallback, Subscription, UpdateOutcome,
};

use crate::clock::ServerClock;
use crate::database::Database;
use crate::feed::{self, ChangeFeed};
use crate::queries;

/// SQLite-backed document store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
    clock: Arc<ServerClock>,
    feed: ChangeFeed,
}

impl SqliteStore {
    /// Create a new store. The database is not opened until [`initialize`](Self::initialize).
    pub fn new(config: StorageConfig) -> Self {
        let feed = ChangeFeed::new(config.change_buffer);
        Self {
            config,
            db: OnceCell::new(),
            clock: Arc::new(ServerClock::new()),
            feed,
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, BazaarError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory() -> Result<Self, BazaarError> {
        Self::open(StorageConfig::in_memory()).await
    }

    /// Opens the database and runs migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), BazaarError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| BazaarError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "document store initialized");
        Ok(())
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, BazaarError> {
        self.db.get().ok_or_else(|| BazaarError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl Adapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, BazaarError> {
        self.db()?.ping().await?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BazaarError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BazaarError> {
        queries::documents::get_document(self.db()?, collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BazaarError> {
        let docs = queries::documents::list_collection(self.db()?, &query.collection).await?;
        Ok(query.evaluate(docs))
    }

    async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<bool, BazaarError> {
        let now = self.clock.now_millis();
        let created =
            queries::documents::insert_if_absent(self.db()?, collection, id, fields, now).await?;
        if created {
            self.feed.publish(collection);
        }
        Ok(created)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Patch,
    ) -> Result<UpdateOutcome, BazaarError> {
        let now = self.clock.now_millis();
        match queries::documents::apply_patch(self.db()?, collection, id, patch, now).await? {
            Some(UpdateOutcome::Applied) => {
                self.feed.publish(collection);
                Ok(UpdateOutcome::Applied)
            }
            Some(UpdateOutcome::PreconditionFailed) => Ok(UpdateOutcome::PreconditionFailed),
            None => Err(BazaarError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn append_child(
        &self,
        parent_collection: &str,
        parent_id: &str,
        sub: &str,
        mut fields: Fields,
    ) -> Result<String, BazaarError> {
        let collection = child_collection(parent_collection, parent_id, sub);
        let id = uuid::Uuid::new_v4().to_string();
        let now = self.clock.now_millis();
        fields.insert("createdAt".to_string(), now.into());
        queries::documents::insert_document(self.db()?, &collection, &id, fields, now).await?;
        self.feed.publish(&collection);
        Ok(id)
    }

    fn subscribe(
        &self,
        query: Query,
        callback: SnapshotCallback,
    ) -> Result<Subscription, BazaarError> {
        let db = self.db()?.clone();
        feed::spawn_live_query(db, &self.feed, query, callback)
    }

    fn server_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
