// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! New-message notifications.

pub mod detector;
pub mod session;

pub use detector::{DetectorStatus, NotificationDetector};
pub use session::NotificationSession;
