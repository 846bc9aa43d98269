// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete chat stack over a fresh SQLite store
//! with mock collaborators: a recording toast sink, a static block list, and
//! a mock upload service.

use std::sync::Arc;

use bazaar_chat::{ChatService, ThreadContext};
use bazaar_config::model::{ChatConfig, NotificationConfig, StorageConfig};
use bazaar_core::{BazaarError, DocumentStore, ItemId, ParticipantProfile, ThreadId, UserId};
use bazaar_storage::SqliteStore;

use crate::mock_block::StaticBlockOracle;
use crate::mock_sink::RecordingSink;
use crate::mock_upload::MockUploader;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    chat: ChatConfig,
    notifications: NotificationConfig,
    file_backed: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            chat: ChatConfig::default(),
            notifications: NotificationConfig::default(),
            file_backed: false,
        }
    }

    pub fn with_chat_config(mut self, chat: ChatConfig) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_notification_config(mut self, notifications: NotificationConfig) -> Self {
        self.notifications = notifications;
        self
    }

    /// Use a temp-file database instead of an in-memory one.
    pub fn with_file_database(mut self) -> Self {
        self.file_backed = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, BazaarError> {
        let (storage_config, temp_dir) = if self.file_backed {
            let temp_dir =
                tempfile::TempDir::new().map_err(|e| BazaarError::Storage { source: e.into() })?;
            let path = temp_dir.path().join("test.db");
            let config = StorageConfig {
                database_path: path.to_string_lossy().into_owned(),
                ..StorageConfig::in_memory()
            };
            (config, Some(temp_dir))
        } else {
            (StorageConfig::in_memory(), None)
        };

        let store = Arc::new(SqliteStore::open(storage_config).await?);
        let uploader = Arc::new(MockUploader::new());
        let oracle = Arc::new(StaticBlockOracle::new());
        let sink = Arc::new(RecordingSink::new());

        let chat = ChatService::builder(store.clone(), uploader.clone())
            .with_block_oracle(oracle.clone())
            .with_chat_config(self.chat)
            .with_notification_config(self.notifications)
            .build();

        Ok(TestHarness {
            store,
            chat,
            uploader,
            oracle,
            sink,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and a fresh store.
pub struct TestHarness {
    /// SQLite document store (in-memory unless built with a file database).
    pub store: Arc<SqliteStore>,
    /// Chat facade wired to the mocks below.
    pub chat: ChatService,
    pub uploader: Arc<MockUploader>,
    /// Block list consulted before every append.
    pub oracle: Arc<StaticBlockOracle>,
    /// Sink for detectors started with [`TestHarness::detector`].
    pub sink: Arc<RecordingSink>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Default harness: in-memory store, default configuration.
    pub async fn new() -> Result<Self, BazaarError> {
        Self::builder().build().await
    }

    /// Context for a conversation about `item`, with profile names derived from the ids.
    pub fn context(buyer: &str, seller: &str, item: &str) -> ThreadContext {
        ThreadContext {
            item_id: ItemId::from(item),
            item_name: format!("Listing {item}"),
            buyer_id: UserId::from(buyer),
            seller_id: UserId::from(seller),
            buyer: ParticipantProfile::new(buyer, None),
            seller: ParticipantProfile::new(seller, None),
        }
    }

    /// Creates (or reopens) the thread for `buyer`, `seller`, and `item`.
    pub async fn open_thread(
        &self,
        buyer: &str,
        seller: &str,
        item: &str,
    ) -> Result<ThreadId, BazaarError> {
        self.chat
            .get_or_create_thread(&Self::context(buyer, seller, item))
            .await
    }

    /// Seeds a listing document so the thread-creation counter has a target.
    pub async fn create_listing(&self, item: &str) -> Result<(), BazaarError> {
        let mut fields = serde_json::Map::new();
        fields.insert("messagesCount".to_string(), 0.into());
        self.store.create_if_absent("listings", item, fields).await?;
        Ok(())
    }

    /// Starts a notification detector delivering into [`TestHarness::sink`].
    pub fn detector(&self) -> Result<bazaar_chat::NotificationDetector, BazaarError> {
        self.chat.notification_detector(self.sink.clone())
    }
}
