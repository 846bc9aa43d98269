// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Bazaar integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without external services.
//!
//! # Components
//!
//! - [`MockUploader`] - Upload service returning `mock://` URLs, with injectable failures
//! - [`RecordingSink`] - Notification sink capturing toasts for assertion
//! - [`StaticBlockOracle`] - In-memory block list
//! - [`TestHarness`] - `ChatService` over a fresh SQLite store wired to the mocks

pub mod harness;
pub mod mock_block;
pub mod mock_sink;
pub mod mock_upload;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_block::StaticBlockOracle;
pub use mock_sink::RecordingSink;
pub use mock_upload::MockUploader;
