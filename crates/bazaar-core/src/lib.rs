// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Bazaar marketplace chat.
//!
//! This crate provides the error type, the domain types for threads and
//! messages, the document-store vocabulary, and the traits every external
//! collaborator implements.

pub mod document;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use document::{Direction, Document, FieldPath, Fields, Filter, Patch, Query, UpdateOutcome};
pub use error::BazaarError;
pub use types::{
    AcceptedOffer, AdapterType, BlockStatus, HealthStatus, ItemId, Message, MessageBody,
    MessageId, OfferStatus, ParticipantProfile, Participants, Role, Thread, ThreadId,
    ThreadSummary, Toast, UserId,
};

pub use traits::{
    Adapter, BlockOracle, DocumentStore, NotificationSink, SnapshotCallback, Subscription,
    UploadService,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bazaar_error_user_facing_classification() {
        assert!(BazaarError::NotMessageSender.is_user_facing());
        assert!(
            BazaarError::OfferNotPending {
                status: OfferStatus::Accepted
            }
            .is_user_facing()
        );
        assert!(
            BazaarError::Blocked {
                blocked_by_me: true,
                blocked_by_other: false
            }
            .is_user_facing()
        );
        let storage = BazaarError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        assert!(!storage.is_user_facing());
        assert!(
            BazaarError::NotFound {
                collection: "threads".into(),
                id: "t".into()
            }
            .is_not_found()
        );
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Store, AdapterType::Upload] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn dropping_subscription_cancels_token() {
        let token = tokio_util::sync::CancellationToken::new();
        let sub = Subscription::new(token.clone());
        assert!(sub.is_active());
        drop(sub);
        assert!(token.is_cancelled());
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_store<T: DocumentStore>() {}
        fn _assert_upload<T: UploadService>() {}
        fn _assert_oracle<T: BlockOracle>() {}
        fn _assert_sink<T: NotificationSink>() {}
    }
}
