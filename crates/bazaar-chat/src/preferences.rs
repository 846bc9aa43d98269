// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user notification preference.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use bazaar_core::{
    BazaarError, Document, DocumentStore, FieldPath, Filter, Patch, Query, Subscription, UserId,
};

pub const USERS: &str = "users";
pub const NOTIFICATIONS_ENABLED: &str = "notificationsEnabled";

fn flag_in(doc: Option<&Document>, default_enabled: bool) -> bool {
    doc.and_then(|d| d.get(&FieldPath::from(NOTIFICATIONS_ENABLED)))
        .and_then(Value::as_bool)
        .unwrap_or(default_enabled)
}

/// Reads and writes `users/<id>.notificationsEnabled`.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn DocumentStore>,
    default_enabled: bool,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn DocumentStore>, default_enabled: bool) -> Self {
        Self {
            store,
            default_enabled,
        }
    }

    /// The flag stored on `doc`, or the default when absent or not a boolean.
    pub fn enabled_in(&self, doc: Option<&Document>) -> bool {
        flag_in(doc, self.default_enabled)
    }

    pub async fn notifications_enabled(&self, user: &UserId) -> Result<bool, BazaarError> {
        let doc = self.store.get(USERS, user.as_str()).await?;
        Ok(self.enabled_in(doc.as_ref()))
    }

    pub async fn set_notifications_enabled(
        &self,
        user: &UserId,
        enabled: bool,
    ) -> Result<(), BazaarError> {
        let mut fields = Map::new();
        fields.insert(NOTIFICATIONS_ENABLED.to_string(), Value::Bool(enabled));
        if !self.store.create_if_absent(USERS, user.as_str(), fields).await? {
            let patch = Patch::new().set(NOTIFICATIONS_ENABLED, enabled);
            self.store.update(USERS, user.as_str(), patch).await?;
        }
        debug!(user = %user, enabled, "notification preference saved");
        Ok(())
    }

    /// Live preference; fires with the current value and on every change to the user document.
    pub fn subscribe<F>(&self, user: &UserId, callback: F) -> Result<Subscription, BazaarError>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let query = Query::collection(USERS).filter(Filter::DocumentId(user.to_string()));
        let default_enabled = self.default_enabled;
        self.store.subscribe(
            query,
            Arc::new(move |docs: Vec<Document>| callback(flag_in(docs.first(), default_enabled))),
        )
    }
}
