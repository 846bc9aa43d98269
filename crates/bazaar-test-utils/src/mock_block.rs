// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory block list implementing `BlockOracle`.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use bazaar_core::{BazaarError, BlockOracle, BlockStatus, UserId};

/// Holds `(blocker, blocked)` pairs.
#[derive(Debug, Default)]
pub struct StaticBlockOracle {
    pairs: Mutex<HashSet<(UserId, UserId)>>,
}

impl StaticBlockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `blocker` has blocked `blocked`.
    pub fn block(&self, blocker: &UserId, blocked: &UserId) {
        self.pairs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((blocker.clone(), blocked.clone()));
    }

    pub fn unblock(&self, blocker: &UserId, blocked: &UserId) {
        self.pairs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(blocker.clone(), blocked.clone()));
    }
}

#[async_trait]
impl BlockOracle for StaticBlockOracle {
    async fn is_blocked(&self, user: &UserId, other: &UserId) -> Result<BlockStatus, BazaarError> {
        let pairs = self.pairs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(BlockStatus {
            blocked_by_me: pairs.contains(&(user.clone(), other.clone())),
            blocked_by_other: pairs.contains(&(other.clone(), user.clone())),
        })
    }
}
