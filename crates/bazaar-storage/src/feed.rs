// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change feed and live-query workers.
//!
//! Every committed write publishes its collection name on a broadcast
//! channel. Each live query owns a worker task that re-runs the query when
//! its collection changes and delivers the result set when it differs from
//! the previous delivery.

use bazaar_core::{BazaarError, Document, Query, SnapshotCallback, Subscription};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::database::Database;
use crate::queries;

/// Broadcasts the collection touched by each committed write.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<String>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, collection: &str) {
        // No receivers simply means no live queries.
        let _ = self.tx.send(collection.to_string());
    }

    pub fn receiver(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Spawns the worker for one live query and returns its handle.
///
/// The feed receiver is taken before the initial read so no write between
/// the read and the first wait can be missed.
pub(crate) fn spawn_live_query(
    db: Database,
    feed: &ChangeFeed,
    query: Query,
    callback: SnapshotCallback,
) -> Result<Subscription, BazaarError> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| BazaarError::Internal(format!("live query needs a tokio runtime: {e}")))?;

    let token = CancellationToken::new();
    let worker_token = token.clone();
    let mut changes = feed.receiver();

    runtime.spawn(async move {
        let mut last: Option<Vec<Document>> = None;
        loop {
            match queries::documents::list_collection(&db, &query.collection).await {
                Ok(docs) => {
                    let snapshot = query.evaluate(docs);
                    if last.as_ref() != Some(&snapshot) {
                        if worker_token.is_cancelled() {
                            return;
                        }
                        callback(snapshot.clone());
                        last = Some(snapshot);
                    }
                }
                Err(e) => {
                    warn!(collection = %query.collection, error = %e, "live query refresh failed");
                }
            }

            if !wait_for_change(&mut changes, &query.collection, &worker_token).await {
                debug!(collection = %query.collection, "live query stopped");
                return;
            }
        }
    });

    Ok(Subscription::new(token))
}

/// Waits until `collection` changes. Returns false once the worker should stop.
async fn wait_for_change(
    changes: &mut broadcast::Receiver<String>,
    collection: &str,
    token: &CancellationToken,
) -> bool {
    loop {
        tokio::select! {
            _ = token.cancelled() => return false,
            changed = changes.recv() => match changed {
                Ok(name) if name == collection => return true,
                Ok(_) => continue,
                // Missed events may include ours; re-read to be safe.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(collection, skipped, "change feed lagged");
                    return true;
                }
                Err(RecvError::Closed) => return false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_receivers_is_harmless() {
        let feed = ChangeFeed::new(4);
        feed.publish("threads");
    }

    #[tokio::test]
    async fn wait_ignores_other_collections() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.receiver();
        let token = CancellationToken::new();
        feed.publish("users");
        feed.publish("threads");
        assert!(wait_for_change(&mut rx, "threads", &token).await);
    }

    #[tokio::test]
    async fn cancelled_token_stops_waiting() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.receiver();
        let token = CancellationToken::new();
        token.cancel();
        assert!(!wait_for_change(&mut rx, "threads", &token).await);
    }
}
