// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bazaar.toml` > `~/.config/bazaar/bazaar.toml` > `/etc/bazaar/bazaar.toml`
//! with environment variable overrides via `BAZAAR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BazaarConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bazaar/bazaar.toml` (system-wide)
/// 3. `~/.config/bazaar/bazaar.toml` (user XDG config)
/// 4. `./bazaar.toml` (local directory)
/// 5. `BAZAAR_*` environment variables
pub fn load_config() -> Result<BazaarConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BazaarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BazaarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BazaarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BazaarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BazaarConfig::default()))
        .merge(Toml::file("/etc/bazaar/bazaar.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("bazaar/bazaar.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("bazaar.toml"))
        .merge(env_provider())
}

/// Environment provider mapping the section prefix to a dotted key.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `BAZAAR_CHAT_WITHDRAW_WINDOW_MS`
/// must become `chat.withdraw_window_ms`, not `chat.withdraw.window.ms`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("BAZAAR_").map(|key| {
        // Keys arrive with their original case.
        let key = key.as_str().to_ascii_lowercase();
        for section in SECTIONS {
            if let Some(field) = key
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{field}").into();
            }
        }
        key.into()
    })
}

const SECTIONS: [&str; 5] = ["storage", "chat", "notifications", "upload", "logging"];
