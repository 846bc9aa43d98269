// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock upload service for deterministic testing.
//!
//! `MockUploader` implements `UploadService` without touching the
//! filesystem. Each upload returns `mock://uploads/<file name>`; failures can
//! be queued with [`MockUploader::fail_next`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use bazaar_core::{Adapter, AdapterType, BazaarError, HealthStatus, UploadService};

/// An upload service that records every reference it is given.
#[derive(Debug, Default)]
pub struct MockUploader {
    uploads: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<String>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next upload fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(message.into());
    }

    /// Local references of successful uploads, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Adapter for MockUploader {
    fn name(&self) -> &str {
        "mock-upload"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Upload
    }

    async fn health_check(&self) -> Result<HealthStatus, BazaarError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BazaarError> {
        Ok(())
    }
}

#[async_trait]
impl UploadService for MockUploader {
    async fn upload(&self, local_ref: &str) -> Result<String, BazaarError> {
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(message) = failure {
            return Err(BazaarError::Upload {
                message,
                source: None,
            });
        }
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(local_ref.to_string());
        let name = local_ref.rsplit('/').next().unwrap_or(local_ref);
        Ok(format!("mock://uploads/{name}"))
    }
}
