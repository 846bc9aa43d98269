// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload service for photo messages.

use async_trait::async_trait;

use crate::error::BazaarError;
use crate::traits::adapter::Adapter;

/// Persists a local resource and returns a durable URL.
#[async_trait]
pub trait UploadService: Adapter {
    /// Uploads `local_ref`. Fails with [`BazaarError::Upload`].
    async fn upload(&self, local_ref: &str) -> Result<String, BazaarError>;
}
