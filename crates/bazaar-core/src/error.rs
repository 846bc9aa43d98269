// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Bazaar marketplace chat.

use thiserror::Error;

use crate::types::OfferStatus;

/// The primary error type used across all Bazaar adapter traits and chat operations.
///
/// Validation failures and missing threads are not represented here: the chat
/// layer treats them as silent no-ops.
#[derive(Debug, Error)]
pub enum BazaarError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store errors (connection failure, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The targeted document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A stored document could not be decoded into its domain type.
    #[error("invalid document {collection}/{id}: {source}")]
    InvalidDocument {
        collection: String,
        id: String,
        source: serde_json::Error,
    },

    /// The upload collaborator failed (transport, size limit, missing file).
    #[error("upload failed: {message}")]
    Upload {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One side of the conversation has blocked the other.
    #[error("conversation is blocked (by me: {blocked_by_me}, by other: {blocked_by_other})")]
    Blocked {
        blocked_by_me: bool,
        blocked_by_other: bool,
    },

    /// The message is older than the withdrawal window.
    #[error("message can no longer be withdrawn (window is {window_ms} ms)")]
    WithdrawWindowExpired { window_ms: u64 },

    /// Only the sender may withdraw a message.
    #[error("only the sender can withdraw this message")]
    NotMessageSender,

    /// The offer has already been accepted or declined.
    #[error("offer is already {status}")]
    OfferNotPending { status: OfferStatus },

    /// The targeted message is not an offer.
    #[error("message {message_id} is not an offer")]
    NotAnOffer { message_id: String },

    /// The targeted message was withdrawn by its sender.
    #[error("message {message_id} was withdrawn")]
    MessageWithdrawn { message_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BazaarError {
    /// Returns true when the error reports a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BazaarError::NotFound { .. })
    }

    /// Returns true for rejections meant to be shown to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BazaarError::Blocked { .. }
                | BazaarError::WithdrawWindowExpired { .. }
                | BazaarError::NotMessageSender
                | BazaarError::OfferNotPending { .. }
                | BazaarError::NotAnOffer { .. }
                | BazaarError::MessageWithdrawn { .. }
        )
    }
}
