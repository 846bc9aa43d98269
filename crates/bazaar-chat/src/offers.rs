// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer sub-protocol layered on the message log.
//!
//! `pending -> accepted` and `pending -> declined` are the only transitions.
//! Each transition is a compare-and-set on the offer message, so two racing
//! responses cannot both succeed. The message is authoritative; the thread's
//! `acceptedOffer` is a denormalized copy written afterwards on a best-effort
//! basis.

use tracing::{debug, info, warn};

use bazaar_core::{
    AcceptedOffer, BazaarError, MessageBody, MessageId, OfferStatus, Patch, ThreadId,
    UpdateOutcome, UserId,
};

use crate::messages::{messages_collection, MessageLog};
use crate::preview::offer_preview;

impl MessageLog {
    /// Appends a pending offer. Non-positive or non-finite amounts are ignored.
    pub async fn send_offer(
        &self,
        thread_id: &ThreadId,
        sender: &UserId,
        amount: f64,
        recipient: Option<&UserId>,
    ) -> Result<Option<MessageId>, BazaarError> {
        if !amount.is_finite() || amount <= 0.0 {
            debug!(thread_id = %thread_id, amount, "offer skipped: invalid amount");
            return Ok(None);
        }
        let Some(target) = self.target(thread_id, sender, recipient).await? else {
            return Ok(None);
        };
        let body = MessageBody::Offer {
            amount,
            offer_status: OfferStatus::Pending,
        };
        let id = self.append(target, sender, body, &offer_preview(amount)).await?;
        info!(thread_id = %thread_id, message_id = %id, amount, "offer sent");
        Ok(Some(id))
    }

    /// Locks the offer as accepted and records it on the thread.
    ///
    /// Returns `false` if the message does not exist.
    pub async fn accept_offer(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        buyer_id: &UserId,
        amount: f64,
    ) -> Result<bool, BazaarError> {
        if !self
            .transition(thread_id, message_id, OfferStatus::Accepted)
            .await?
        {
            return Ok(false);
        }
        info!(thread_id = %thread_id, message_id = %message_id, amount, "offer accepted");

        let accepted = AcceptedOffer {
            buyer_id: buyer_id.clone(),
            amount,
            accepted_at: self.store.server_now(),
        };
        if let Err(e) = self.threads.record_accepted_offer(thread_id, &accepted).await {
            warn!(thread_id = %thread_id, error = %e, "accepted offer not recorded on thread");
        }
        Ok(true)
    }

    /// Locks the offer as declined. The thread preview is left alone.
    ///
    /// Returns `false` if the message does not exist.
    pub async fn decline_offer(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<bool, BazaarError> {
        let declined = self
            .transition(thread_id, message_id, OfferStatus::Declined)
            .await?;
        if declined {
            info!(thread_id = %thread_id, message_id = %message_id, "offer declined");
        }
        Ok(declined)
    }

    /// Moves an offer to `next` from every status allowed to reach it.
    ///
    /// Fails with `OfferNotPending`, `NotAnOffer` or `MessageWithdrawn` when
    /// the message cannot make the transition.
    async fn transition(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        next: OfferStatus,
    ) -> Result<bool, BazaarError> {
        let Some(from) = OfferStatus::source_of(next) else {
            return Err(BazaarError::Internal(format!("no offer status leads to {next}")));
        };
        let collection = messages_collection(thread_id);
        let patch = Patch::new()
            .expect("type", "offer")
            .expect("withdrawn", false)
            .expect("offerStatus", from.to_string())
            .set("offerStatus", next.to_string());

        match self.store.update(&collection, message_id.as_str(), patch).await {
            Ok(UpdateOutcome::Applied) => Ok(true),
            Ok(UpdateOutcome::PreconditionFailed) => {
                Err(self.rejection(thread_id, message_id).await?)
            }
            Err(e) if e.is_not_found() => {
                debug!(thread_id = %thread_id, message_id = %message_id, "offer transition skipped: message missing");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Explains why a transition's precondition failed.
    async fn rejection(
        &self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<BazaarError, BazaarError> {
        let message = self.get_message(thread_id, message_id).await?;
        Ok(match message {
            Some(m) if m.withdrawn => BazaarError::MessageWithdrawn {
                message_id: message_id.to_string(),
            },
            Some(m) => match m.offer_status() {
                Some(status) => BazaarError::OfferNotPending { status },
                None => BazaarError::NotAnOffer {
                    message_id: message_id.to_string(),
                },
            },
            None => BazaarError::NotAnOffer {
                message_id: message_id.to_string(),
            },
        })
    }
}
