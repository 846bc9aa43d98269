// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread preview strings and thread-list summaries.
//!
//! The stored `lastMessage` never carries raw photo or offer payloads; these
//! helpers synthesize the human-readable text for each kind of log entry and
//! derive the per-viewer [`ThreadSummary`].

use bazaar_core::{Role, Thread, ThreadSummary, UserId};

pub const PHOTO_PREVIEW: &str = "[Photo]";
pub const WITHDRAWN_PREVIEW: &str = "Message withdrawn";

/// Whole amounts print without decimals, everything else with two.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

pub fn offer_preview(amount: f64) -> String {
    format!("Offer: ${}", format_amount(amount))
}

pub fn accepted_offer_preview(amount: f64) -> String {
    format!("Offer accepted (${})", format_amount(amount))
}

/// Hides a withdrawal notice once every participant has read it.
pub fn sanitize_preview(thread: &Thread) -> String {
    let all_read = thread.unread.values().all(|&count| count == 0);
    if thread.last_message == WITHDRAWN_PREVIEW && all_read {
        String::new()
    } else {
        thread.last_message.clone()
    }
}

/// Builds the thread-list row `viewer` sees, or `None` if they are not a participant.
pub fn summarize(thread: &Thread, viewer: &UserId) -> Option<ThreadSummary> {
    let role = thread.participants.role_of(viewer)?;
    let partner_role = match role {
        Role::Buyer => Role::Seller,
        Role::Seller => Role::Buyer,
    };
    let partner = thread.profile(partner_role);
    Some(ThreadSummary {
        thread_id: thread.id.clone(),
        item_id: thread.item_id.clone(),
        item_name: thread.item_name.clone(),
        partner_id: thread.participants.get(partner_role).clone(),
        partner_name: partner.name.clone(),
        partner_initials: partner.initials.clone(),
        preview: sanitize_preview(thread),
        timestamp: thread.timestamp,
        unread: thread.unread_for(viewer),
        accepted_offer: thread.accepted_offer.clone(),
    })
}
