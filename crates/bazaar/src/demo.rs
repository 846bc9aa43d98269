// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bazaar demo` command implementation.
//!
//! Plays a short buyer/seller conversation against an in-memory store while a
//! notification detector watches the seller's thread list.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use bazaar_chat::preview::summarize;
use bazaar_chat::{ChatService, ThreadContext};
use bazaar_config::BazaarConfig;
use bazaar_config::model::StorageConfig;
use bazaar_core::{
    Adapter, BazaarError, ItemId, Message, MessageBody, ParticipantProfile, UserId,
};
use bazaar_storage::{LocalDirUploader, SqliteStore};

use crate::sink::TracingSink;

const HYDRATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Lets the detector see the last write before the report is printed.
const SETTLE: Duration = Duration::from_millis(200);

pub async fn run_demo(config: &BazaarConfig) -> Result<(), BazaarError> {
    let scratch = tempfile::TempDir::new()
        .map_err(|e| BazaarError::Internal(format!("demo scratch dir: {e}")))?;
    let store = Arc::new(SqliteStore::open(StorageConfig::in_memory()).await?);
    let uploader = Arc::new(LocalDirUploader::new(
        scratch.path().join("media"),
        config.upload.max_upload_bytes,
    ));
    let chat = ChatService::builder(store.clone(), uploader)
        .with_config(config)
        .build();

    let buyer = UserId::from("ada");
    let seller = UserId::from("sam");
    let ctx = ThreadContext {
        item_id: ItemId::from("bike-42"),
        item_name: "Road bike".to_string(),
        buyer_id: buyer.clone(),
        seller_id: seller.clone(),
        buyer: ParticipantProfile::new("Ada Byrne", None),
        seller: ParticipantProfile::new("Sam Seller", None),
    };

    let detector = chat.notification_detector(Arc::new(TracingSink))?;
    detector.set_user(Some(seller.clone()));
    if tokio::time::timeout(HYDRATION_TIMEOUT, detector.wait_for(|s| s.hydrated))
        .await
        .is_err()
    {
        warn!("detector did not hydrate; toasts may be missing");
    }

    let thread = chat.get_or_create_thread(&ctx).await?;
    info!(thread_id = %thread, "demo thread ready");

    let Some(greeting) = chat
        .send_message(&thread, &buyer, "Hi! Is the bike still available?", None)
        .await?
    else {
        return Err(BazaarError::Internal("greeting was not sent".into()));
    };
    chat.send_message(&thread, &seller, "Yes, it is.", None).await?;

    let photo = scratch.path().join("bike.jpg");
    tokio::fs::write(&photo, b"\xFF\xD8\xFF demo jpeg")
        .await
        .map_err(|e| BazaarError::Internal(format!("demo photo: {e}")))?;
    chat.send_photo(&thread, &seller, &photo.to_string_lossy(), None)
        .await?;

    chat.toggle_reaction(&thread, &greeting, &seller, "wave")
        .await?;

    let Some(offer) = chat.send_offer(&thread, &buyer, 250.0, None).await? else {
        return Err(BazaarError::Internal("offer was not sent".into()));
    };
    chat.accept_offer(&thread, &offer, &buyer, 250.0).await?;

    if let Some(typo) = chat
        .send_message(&thread, &buyer, "Can pick up tmorrow", None)
        .await?
    {
        chat.withdraw_own_message(&thread, &typo, &buyer).await?;
    }
    chat.send_message(&thread, &buyer, "Can pick up tomorrow", None)
        .await?;

    tokio::time::sleep(SETTLE).await;
    chat.clear_unread(&thread, &seller).await?;

    println!();
    println!("  bazaar demo");
    println!("  {}", "-".repeat(50));
    for message in chat.messages().list_messages(&thread).await? {
        println!("    {}", describe(&message));
    }
    if let Some(summary) = chat
        .thread(&thread)
        .await?
        .and_then(|t| summarize(&t, &seller))
    {
        println!("  {}", "-".repeat(50));
        println!(
            "    {} with {}: \"{}\" ({} unread)",
            summary.item_name, summary.partner_name, summary.preview, summary.unread
        );
    }
    println!();

    drop(detector);
    store.shutdown().await
}

fn describe(message: &Message) -> String {
    let body = if message.withdrawn {
        "(withdrawn)".to_string()
    } else {
        match &message.body {
            MessageBody::Text { text } => text.clone(),
            MessageBody::Photo { photo_url } => format!("[photo] {photo_url}"),
            MessageBody::Offer {
                amount,
                offer_status,
            } => format!("[offer] ${amount} {offer_status}"),
        }
    };
    let reactions: Vec<&str> = message
        .reactions
        .values()
        .filter_map(|r| r.as_deref())
        .collect();
    if reactions.is_empty() {
        format!("{:<4} {body}", message.sender_id.as_str())
    } else {
        format!("{:<4} {body} [{}]", message.sender_id.as_str(), reactions.join(" "))
    }
}
