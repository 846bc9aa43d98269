// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic thread identity.

use bazaar_core::{ItemId, ThreadId, UserId};

/// Base id shared by every thread between the same two users.
///
/// The lower id always comes first, so the result does not depend on who
/// opened the conversation.
pub fn make_thread_id(a: &UserId, b: &UserId) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}_{high}")
}

/// Full thread id: one thread per user pair per listing.
pub fn thread_id_for(a: &UserId, b: &UserId, item: &ItemId) -> ThreadId {
    ThreadId(format!("{}_{item}", make_thread_id(a, b)))
}
