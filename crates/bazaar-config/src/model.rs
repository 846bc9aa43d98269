// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Bazaar marketplace chat.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Bazaar configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BazaarConfig {
    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Messaging rules.
    #[serde(default)]
    pub chat: ChatConfig,

    /// New-message notification settings.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Photo upload settings.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for file databases.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Capacity of the change feed that wakes live queries.
    #[serde(default = "default_change_buffer")]
    pub change_buffer: usize,
}

impl StorageConfig {
    /// An in-memory store, used by tests and the demo.
    pub fn in_memory() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            ..Self::default()
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            change_buffer: default_change_buffer(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("bazaar").join("bazaar.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("bazaar.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_change_buffer() -> usize {
    256
}

/// Messaging rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// How long after sending a message its sender may withdraw it.
    #[serde(default = "default_withdraw_window_ms")]
    pub withdraw_window_ms: u64,

    /// Reject appends when either participant has blocked the other.
    #[serde(default = "default_enforce_blocking")]
    pub enforce_blocking: bool,

    /// Maximum text length in characters; longer text is ignored.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            withdraw_window_ms: default_withdraw_window_ms(),
            enforce_blocking: default_enforce_blocking(),
            max_text_len: default_max_text_len(),
        }
    }
}

fn default_withdraw_window_ms() -> u64 {
    180_000
}

fn default_enforce_blocking() -> bool {
    true
}

fn default_max_text_len() -> usize {
    4000
}

/// New-message notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Whether users without a stored preference get notifications.
    #[serde(default = "default_notifications_enabled")]
    pub default_enabled: bool,

    /// Toast title when the partner name is unknown.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_enabled: default_notifications_enabled(),
            fallback_title: default_fallback_title(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_fallback_title() -> String {
    "New message".to_string()
}

/// Photo upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory receiving uploaded photos.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,

    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_media_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("bazaar").join("media"))
        .unwrap_or_else(|| std::path::PathBuf::from("media"))
        .to_string_lossy()
        .into_owned()
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
