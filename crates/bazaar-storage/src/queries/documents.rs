// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document CRUD operations.

use bazaar_core::{BazaarError, Document, Fields, Patch, UpdateOutcome};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database, DbError};

fn parse_fields(raw: &str) -> Result<Fields, DbError> {
    Ok(serde_json::from_str(raw)?)
}

/// Fetch one document by collection and id.
pub async fn get_document(
    db: &Database,
    collection: &str,
    id: &str,
) -> Result<Option<Document>, BazaarError> {
    let collection = collection.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Document>, DbError> {
            let row = conn
                .query_row(
                    "SELECT fields, created_at FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            row.map(|(raw, created_at)| {
                Ok(Document {
                    collection,
                    id,
                    fields: parse_fields(&raw)?,
                    created_at,
                })
            })
            .transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a document unless one already exists. Returns whether it was inserted.
pub async fn insert_if_absent(
    db: &Database,
    collection: &str,
    id: &str,
    fields: Fields,
    now_ms: i64,
) -> Result<bool, BazaarError> {
    let collection = collection.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, DbError> {
            let raw = serde_json::to_string(&fields)?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO documents (collection, id, fields, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![collection, id, raw, now_ms],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a patch inside one transaction.
///
/// Returns `None` if the document does not exist.
pub async fn apply_patch(
    db: &Database,
    collection: &str,
    id: &str,
    patch: Patch,
    now_ms: i64,
) -> Result<Option<UpdateOutcome>, BazaarError> {
    let collection = collection.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<UpdateOutcome>, DbError> {
            let tx = conn.transaction()?;
            let raw: Option<String> = tx
                .query_row(
                    "SELECT fields FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(raw) = raw else {
                return Ok(None);
            };

            let mut fields = parse_fields(&raw)?;
            if !patch.preconditions_hold(&fields) {
                return Ok(Some(UpdateOutcome::PreconditionFailed));
            }
            patch.apply(&mut fields, now_ms);

            tx.execute(
                "UPDATE documents SET fields = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
                params![collection, id, serde_json::to_string(&fields)?, now_ms],
            )?;
            tx.commit()?;
            Ok(Some(UpdateOutcome::Applied))
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new document; fails on an id collision.
pub async fn insert_document(
    db: &Database,
    collection: &str,
    id: &str,
    fields: Fields,
    now_ms: i64,
) -> Result<(), BazaarError> {
    let collection = collection.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), DbError> {
            conn.execute(
                "INSERT INTO documents (collection, id, fields, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![collection, id, serde_json::to_string(&fields)?, now_ms],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All documents of a collection in creation order.
pub async fn list_collection(
    db: &Database,
    collection: &str,
) -> Result<Vec<Document>, BazaarError> {
    let collection = collection.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Document>, DbError> {
            let mut stmt = conn.prepare(
                "SELECT id, fields, created_at FROM documents
                 WHERE collection = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![collection], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            let mut docs = Vec::new();
            for row in rows {
                let (id, raw, created_at) = row?;
                docs.push(Document {
                    collection: collection.clone(),
                    id,
                    fields: parse_fields(&raw)?,
                    created_at,
                });
            }
            Ok(docs)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::IN_MEMORY;
    use bazaar_core::FieldPath;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    async fn setup() -> Database {
        Database::open(IN_MEMORY, false).await.unwrap()
    }

    #[tokio::test]
    async fn insert_if_absent_only_once() {
        let db = setup().await;
        assert!(insert_if_absent(&db, "threads", "t1", fields(json!({"n": 1})), 10).await.unwrap());
        assert!(!insert_if_absent(&db, "threads", "t1", fields(json!({"n": 2})), 11).await.unwrap());

        let doc = get_document(&db, "threads", "t1").await.unwrap().unwrap();
        assert_eq!(doc.fields["n"], json!(1));
        assert_eq!(doc.created_at, 10);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = setup().await;
        assert!(get_document(&db, "threads", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_missing_document_returns_none() {
        let db = setup().await;
        let outcome = apply_patch(&db, "threads", "nope", Patch::new().set("a", 1), 1)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn failed_precondition_writes_nothing() {
        let db = setup().await;
        insert_document(&db, "m", "1", fields(json!({"offerStatus": "accepted"})), 1)
            .await
            .unwrap();
        let patch = Patch::new()
            .expect("offerStatus", "pending")
            .set("offerStatus", "declined");
        let outcome = apply_patch(&db, "m", "1", patch, 2).await.unwrap();
        assert_eq!(outcome, Some(UpdateOutcome::PreconditionFailed));

        let doc = get_document(&db, "m", "1").await.unwrap().unwrap();
        assert_eq!(doc.get(&"offerStatus".into()), Some(&json!("accepted")));
    }

    #[tokio::test]
    async fn increments_accumulate() {
        let db = setup().await;
        insert_document(&db, "threads", "t", fields(json!({"unread": {"a": 0}})), 1)
            .await
            .unwrap();
        for i in 0..3 {
            let patch = Patch::new().increment(FieldPath::new(["unread", "a"]), 1);
            apply_patch(&db, "threads", "t", patch, 2 + i).await.unwrap();
        }
        let doc = get_document(&db, "threads", "t").await.unwrap().unwrap();
        assert_eq!(doc.fields["unread"]["a"], json!(3));
    }

    #[tokio::test]
    async fn list_is_scoped_and_ordered() {
        let db = setup().await;
        insert_document(&db, "threads/t/messages", "b", Fields::new(), 2).await.unwrap();
        insert_document(&db, "threads/t/messages", "a", Fields::new(), 1).await.unwrap();
        insert_document(&db, "threads/u/messages", "c", Fields::new(), 0).await.unwrap();

        let docs = list_collection(&db, "threads/t/messages").await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
