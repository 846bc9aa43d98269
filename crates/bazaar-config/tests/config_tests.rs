// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Bazaar configuration system.

use bazaar_config::diagnostic::ConfigError;
use bazaar_config::model::BazaarConfig;
use bazaar_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[storage]
database_path = "/tmp/bazaar-test.db"
wal_mode = false
change_buffer = 32

[chat]
withdraw_window_ms = 60000
enforce_blocking = false
max_text_len = 500

[notifications]
default_enabled = false
fallback_title = "Bazaar"

[upload]
media_dir = "/tmp/media"
max_upload_bytes = 2048

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.storage.database_path, "/tmp/bazaar-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.change_buffer, 32);
    assert_eq!(config.chat.withdraw_window_ms, 60_000);
    assert!(!config.chat.enforce_blocking);
    assert_eq!(config.chat.max_text_len, 500);
    assert!(!config.notifications.default_enabled);
    assert_eq!(config.notifications.fallback_title, "Bazaar");
    assert_eq!(config.upload.media_dir, "/tmp/media");
    assert_eq!(config.upload.max_upload_bytes, 2048);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    let defaults = BazaarConfig::default();
    assert_eq!(config.chat.withdraw_window_ms, 180_000);
    assert!(config.chat.enforce_blocking);
    assert!(config.notifications.default_enabled);
    assert_eq!(config.notifications.fallback_title, "New message");
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[chat]
withdraw_windw_ms = 1000
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key must be rejected");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("withdraw_window_ms"));
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[payments]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[chat]
enforce_blocking = "sometimes"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn semantic_validation_runs_after_parsing() {
    let toml = r#"
[chat]
withdraw_window_ms = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero window must fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("withdraw_window_ms"))));
}

#[test]
fn loads_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bazaar.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.logging.level, "warn");
}
