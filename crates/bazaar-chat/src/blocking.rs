// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking enforcement in front of every log append.

use std::sync::Arc;

use bazaar_config::model::ChatConfig;
use bazaar_core::{BazaarError, BlockOracle, BlockStatus, UserId};
use tracing::debug;

/// Rejects appends between users where either side has blocked the other.
///
/// A guard without an oracle lets everything through.
#[derive(Clone, Default)]
pub struct BlockGuard {
    oracle: Option<Arc<dyn BlockOracle>>,
}

impl BlockGuard {
    pub fn new(oracle: Arc<dyn BlockOracle>) -> Self {
        Self {
            oracle: Some(oracle),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Honors `chat.enforce_blocking`.
    pub fn from_config(oracle: Option<Arc<dyn BlockOracle>>, config: &ChatConfig) -> Self {
        Self {
            oracle: oracle.filter(|_| config.enforce_blocking),
        }
    }

    pub fn is_enforcing(&self) -> bool {
        self.oracle.is_some()
    }

    /// Blocking status of `user` towards `other`; all clear when not enforcing.
    pub async fn status(&self, user: &UserId, other: &UserId) -> Result<BlockStatus, BazaarError> {
        match &self.oracle {
            Some(oracle) => oracle.is_blocked(user, other).await,
            None => Ok(BlockStatus::default()),
        }
    }

    pub async fn ensure_can_message(
        &self,
        sender: &UserId,
        recipient: &UserId,
    ) -> Result<(), BazaarError> {
        let status = self.status(sender, recipient).await?;
        if status.is_blocked() {
            debug!(
                sender = %sender,
                recipient = %recipient,
                blocked_by_me = status.blocked_by_me,
                blocked_by_other = status.blocked_by_other,
                "append rejected: conversation blocked"
            );
            return Err(BazaarError::Blocked {
                blocked_by_me: status.blocked_by_me,
                blocked_by_other: status.blocked_by_other,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_test_utils::StaticBlockOracle;

    fn oracle() -> Arc<StaticBlockOracle> {
        let oracle = StaticBlockOracle::new();
        oracle.block(&"alice".into(), &"bob".into());
        Arc::new(oracle)
    }

    #[tokio::test]
    async fn blocked_in_either_direction() {
        let guard = BlockGuard::new(oracle());

        let err = guard
            .ensure_can_message(&"alice".into(), &"bob".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BazaarError::Blocked {
                blocked_by_me: true,
                blocked_by_other: false
            }
        ));

        let err = guard
            .ensure_can_message(&"bob".into(), &"alice".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BazaarError::Blocked {
                blocked_by_me: false,
                blocked_by_other: true
            }
        ));
        assert!(err.is_user_facing());
    }

    #[tokio::test]
    async fn unrelated_users_pass() {
        let guard = BlockGuard::new(oracle());
        guard
            .ensure_can_message(&"alice".into(), &"carol".into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn config_can_disable_enforcement() {
        let config = ChatConfig {
            enforce_blocking: false,
            ..ChatConfig::default()
        };
        let guard = BlockGuard::from_config(Some(oracle()), &config);
        assert!(!guard.is_enforcing());
        guard
            .ensure_can_message(&"alice".into(), &"bob".into())
            .await
            .unwrap();
    }
}
