// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking-status oracle.

use async_trait::async_trait;

use crate::error::BazaarError;
use crate::types::{BlockStatus, UserId};

/// Answers whether two users have blocked each other.
#[async_trait]
pub trait BlockOracle: Send + Sync {
    /// Status from `user`'s point of view towards `other`.
    async fn is_blocked(&self, user: &UserId, other: &UserId) -> Result<BlockStatus, BazaarError>;
}
