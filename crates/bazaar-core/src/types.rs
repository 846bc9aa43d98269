// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Bazaar crates.
//!
//! Threads and messages are stored as camelCase JSON documents; the serde
//! attributes here define that document layout.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Opaque identifier of a marketplace user.
    UserId
);
string_id!(
    /// Identifier of a listing.
    ItemId
);
string_id!(
    /// Deterministic identifier of a conversation thread.
    ThreadId
);
string_id!(
    /// Store-assigned identifier of a message within a thread.
    MessageId
);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Upload,
}

/// Which side of the listing a participant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

/// The two fixed participants of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participants {
    pub buyer_id: UserId,
    pub seller_id: UserId,
}

impl Participants {
    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        if *user == self.buyer_id {
            Some(Role::Buyer)
        } else if *user == self.seller_id {
            Some(Role::Seller)
        } else {
            None
        }
    }

    /// The participant that is not `user`, or `None` if `user` is not in the thread.
    pub fn other(&self, user: &UserId) -> Option<&UserId> {
        match self.role_of(user)? {
            Role::Buyer => Some(&self.seller_id),
            Role::Seller => Some(&self.buyer_id),
        }
    }

    pub fn get(&self, role: Role) -> &UserId {
        match role {
            Role::Buyer => &self.buyer_id,
            Role::Seller => &self.seller_id,
        }
    }
}

/// Display metadata for one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: String,
}

impl ParticipantProfile {
    /// Builds a profile, deriving initials from the name when none are given.
    pub fn new(name: impl Into<String>, initials: Option<String>) -> Self {
        let name = name.into();
        let initials = initials
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| derive_initials(&name));
        Self { name, initials }
    }
}

/// First letter of up to two words, uppercased. `"?"` for a blank name.
pub fn derive_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

/// Record of the offer a seller accepted, denormalized onto the thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedOffer {
    pub buyer_id: UserId,
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub accepted_at: DateTime<Utc>,
}

/// A conversation between one buyer and one seller about one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Document id; not part of the stored fields.
    #[serde(skip)]
    pub id: ThreadId,
    pub item_id: ItemId,
    #[serde(default)]
    pub item_name: String,
    pub participants: Participants,
    /// Both participant ids, kept for membership queries.
    pub participant_ids: Vec<UserId>,
    #[serde(default)]
    pub buyer: ParticipantProfile,
    #[serde(default)]
    pub seller: ParticipantProfile,
    #[serde(default)]
    pub last_message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Unread counter per participant id.
    #[serde(default)]
    pub unread: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_offer: Option<AcceptedOffer>,
}

impl Thread {
    pub fn unread_for(&self, user: &UserId) -> u32 {
        self.unread.get(user.as_str()).copied().unwrap_or(0)
    }

    pub fn profile(&self, role: Role) -> &ParticipantProfile {
        match role {
            Role::Buyer => &self.buyer,
            Role::Seller => &self.seller,
        }
    }
}

/// Lifecycle of an offer message. Transitions only leave `Pending`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }

    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        *self == OfferStatus::Pending && next.is_terminal()
    }

    /// The status an offer must hold to move to `next`, if any.
    pub fn source_of(next: OfferStatus) -> Option<OfferStatus> {
        OfferStatus::iter().find(|s| s.can_transition_to(next))
    }
}

/// Content variant of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Text {
        #[serde(default)]
        text: String,
    },
    Photo {
        #[serde(rename = "photoUrl", default)]
        photo_url: String,
    },
    Offer {
        amount: f64,
        #[serde(rename = "offerStatus")]
        offer_status: OfferStatus,
    },
}

/// A single entry in a thread's message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Document id; not part of the stored fields.
    #[serde(skip)]
    pub id: MessageId,
    pub sender_id: UserId,
    /// Assigned by the store at write time.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub body: MessageBody,
    #[serde(default)]
    pub withdrawn: bool,
    /// Reaction token per participant id; `None` once removed.
    #[serde(default)]
    pub reactions: BTreeMap<String, Option<String>>,
}

impl Message {
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn photo_url(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Photo { photo_url } => Some(photo_url),
            _ => None,
        }
    }

    pub fn offer_status(&self) -> Option<OfferStatus> {
        match &self.body {
            MessageBody::Offer { offer_status, .. } => Some(*offer_status),
            _ => None,
        }
    }

    pub fn reaction_of(&self, user: &UserId) -> Option<&str> {
        self.reactions
            .get(user.as_str())
            .and_then(|r| r.as_deref())
    }
}

/// A thread as seen from one participant's thread list.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub thread_id: ThreadId,
    pub item_id: ItemId,
    pub item_name: String,
    pub partner_id: UserId,
    pub partner_name: String,
    pub partner_initials: String,
    /// Sanitized preview text.
    pub preview: String,
    pub timestamp: DateTime<Utc>,
    /// The viewing user's own unread counter.
    pub unread: u32,
    pub accepted_offer: Option<AcceptedOffer>,
}

/// Result of a blocking-status lookup between two users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStatus {
    pub blocked_by_me: bool,
    pub blocked_by_other: bool,
}

impl BlockStatus {
    pub fn is_blocked(&self) -> bool {
        self.blocked_by_me || self.blocked_by_other
    }
}

/// A notification to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
}
