// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Bazaar marketplace chat.
//!
//! Stores JSON documents in one table keyed by `(collection, id)`, with
//! embedded migrations, a single-writer concurrency model via
//! `tokio-rusqlite`, and live queries woken by an in-process change feed.

pub mod adapter;
pub mod clock;
pub mod database;
pub mod feed;
pub mod migrations;
pub mod queries;
pub mod uploader;

pub use adapter::SqliteStore;
pub use database::Database;
pub use uploader::LocalDirUploader;
