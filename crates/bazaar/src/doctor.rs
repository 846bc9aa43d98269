// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bazaar doctor` command implementation.
//!
//! Opens the configured collaborators and reports their health.

use std::path::Path;
use std::time::{Duration, Instant};

use bazaar_config::BazaarConfig;
use bazaar_config::model::StorageConfig;
use bazaar_core::{Adapter, BazaarError, HealthStatus};
use bazaar_storage::{LocalDirUploader, SqliteStore};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }

    fn from_health(name: &str, health: Result<HealthStatus, BazaarError>, start: Instant) -> Self {
        match health {
            Ok(HealthStatus::Healthy) => Self::new(name, CheckStatus::Pass, "healthy", start),
            Ok(HealthStatus::Degraded(reason)) => Self::new(name, CheckStatus::Warn, reason, start),
            Ok(HealthStatus::Unhealthy(reason)) => Self::new(name, CheckStatus::Fail, reason, start),
            Err(e) => Self::new(name, CheckStatus::Fail, e.to_string(), start),
        }
    }
}

/// Runs every check, prints the report, and fails if any check failed.
pub async fn run_doctor(config: &BazaarConfig) -> Result<(), BazaarError> {
    let results = vec![
        check_database(&config.storage).await,
        check_uploads(config).await,
    ];

    println!();
    println!("  bazaar doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => {
                fail_count += 1;
                "[FAIL]"
            }
        };
        println!(
            "    {tag} {:<20} {} ({}ms)",
            result.name,
            result.message,
            result.duration.as_millis()
        );
    }
    println!();

    if fail_count > 0 {
        return Err(BazaarError::Internal(format!(
            "{fail_count} doctor check(s) failed"
        )));
    }
    println!("  No failing checks.");
    println!();
    Ok(())
}

/// Opens the document store and pings it. A database file that does not
/// exist yet is a warning; it is created on first use.
async fn check_database(storage: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let path = &storage.database_path;
    if path != ":memory:" && !Path::new(path).exists() {
        return CheckResult::new(
            "Document store",
            CheckStatus::Warn,
            format!("not found: {path} (will be created on first run)"),
            start,
        );
    }

    let store = match SqliteStore::open(storage.clone()).await {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::new(
                "Document store",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };
    let health = store.health_check().await;
    if let Err(e) = store.shutdown().await {
        tracing::warn!(error = %e, "document store shutdown failed");
    }
    CheckResult::from_health("Document store", health, start)
}

async fn check_uploads(config: &BazaarConfig) -> CheckResult {
    let start = Instant::now();
    let uploader = LocalDirUploader::from_config(&config.upload);
    CheckResult::from_health("Upload directory", uploader.health_check().await, start)
}
