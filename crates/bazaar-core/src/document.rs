// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document-store vocabulary: documents, field paths, patches, and queries.
//!
//! These types are backend-agnostic. Patch application and query evaluation
//! are pure functions over JSON maps so every store implementation shares the
//! same merge, increment, and ordering semantics.

use std::cmp::Ordering;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::BazaarError;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Collection path of a child collection, e.g. `threads/<id>/messages`.
pub fn child_collection(parent_collection: &str, parent_id: &str, sub: &str) -> String {
    format!("{parent_collection}/{parent_id}/{sub}")
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
    /// Store-assigned creation time in milliseconds since the epoch.
    pub created_at: i64,
}

impl Document {
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.fields)
    }

    /// Deserializes the document fields into a domain type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BazaarError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            BazaarError::InvalidDocument {
                collection: self.collection.clone(),
                id: self.id.clone(),
                source,
            }
        })
    }
}

/// Path to a (possibly nested) field, stored as explicit segments.
///
/// Segments are never split on `.`, so map keys such as user ids may contain
/// any character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn lookup<'a>(&self, fields: &'a Fields) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        let mut current = fields.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns the parent map of the leaf, creating intermediate objects.
    ///
    /// Any non-object value along the way is replaced by an empty object.
    fn parent_mut<'a>(&self, fields: &'a mut Fields) -> Option<(&'a mut Fields, &str)> {
        let (leaf, parents) = self.0.split_last()?;
        let mut current = fields;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = slot.as_object_mut()?;
        }
        Some((current, leaf.as_str()))
    }
}

impl From<&str> for FieldPath {
    fn from(field: &str) -> Self {
        Self(vec![field.to_string()])
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A single field mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Set(FieldPath, Value),
    /// Atomic numeric add; a missing or non-numeric field counts as zero.
    Increment(FieldPath, i64),
    /// Replaced with the store's clock at write time.
    ServerTimestamp(FieldPath),
    Delete(FieldPath),
}

/// Outcome of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// At least one expectation did not hold; nothing was written.
    PreconditionFailed,
}

/// An atomic merge update with optional preconditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: Vec<PatchOp>,
    expect: Vec<(FieldPath, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.ops.push(PatchOp::Set(path.into(), value.into()));
        self
    }

    pub fn increment(mut self, path: impl Into<FieldPath>, by: i64) -> Self {
        self.ops.push(PatchOp::Increment(path.into(), by));
        self
    }

    pub fn server_timestamp(mut self, path: impl Into<FieldPath>) -> Self {
        self.ops.push(PatchOp::ServerTimestamp(path.into()));
        self
    }

    pub fn delete(mut self, path: impl Into<FieldPath>) -> Self {
        self.ops.push(PatchOp::Delete(path.into()));
        self
    }

    /// Requires `path` to equal `value` at write time.
    pub fn expect(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.expect.push((path.into(), value.into()));
        self
    }

    pub fn preconditions_hold(&self, fields: &Fields) -> bool {
        self.expect
            .iter()
            .all(|(path, expected)| path.lookup(fields) == Some(expected))
    }

    /// Applies every op in order. `now_ms` feeds `ServerTimestamp`.
    pub fn apply(&self, fields: &mut Fields, now_ms: i64) {
        for op in &self.ops {
            match op {
                PatchOp::Set(path, value) => {
                    if let Some((parent, leaf)) = path.parent_mut(fields) {
                        parent.insert(leaf.to_string(), value.clone());
                    }
                }
                PatchOp::Increment(path, by) => {
                    if let Some((parent, leaf)) = path.parent_mut(fields) {
                        let current = parent.get(leaf).and_then(Value::as_i64).unwrap_or(0);
                        parent.insert(leaf.to_string(), Value::from(current.saturating_add(*by)));
                    }
                }
                PatchOp::ServerTimestamp(path) => {
                    if let Some((parent, leaf)) = path.parent_mut(fields) {
                        parent.insert(leaf.to_string(), Value::from(now_ms));
                    }
                }
                PatchOp::Delete(path) => {
                    if let Some((parent, leaf)) = path.parent_mut(fields) {
                        parent.remove(leaf);
                    }
                }
            }
        }
    }
}

/// Query filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The field is an array holding `value`.
    ArrayContains(FieldPath, Value),
    DocumentId(String),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::ArrayContains(path, value) => doc
                .get(path)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::DocumentId(id) => doc.id == *id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A live or one-shot query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<Filter>,
    pub order_by: Option<FieldPath>,
    pub direction: Direction,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: None,
            order_by: None,
            direction: Direction::Ascending,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, path: impl Into<FieldPath>, direction: Direction) -> Self {
        self.order_by = Some(path.into());
        self.direction = direction;
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.collection == self.collection
            && self.filter.as_ref().is_none_or(|f| f.matches(doc))
    }

    /// Filters and orders a collection scan into the query's result set.
    ///
    /// Ties on the order field fall back to creation time, then id.
    pub fn evaluate(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        result.sort_by(|a, b| {
            let primary = match &self.order_by {
                Some(path) => compare_values(a.get(path), b.get(path)),
                None => Ordering::Equal,
            };
            let primary = match self.direction {
                Direction::Ascending => primary,
                Direction::Descending => primary.reverse(),
            };
            primary
                .then(a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        result
    }
}

/// Total order over optional JSON values: missing < null < bool < number < string < other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn doc(id: &str, created_at: i64, value: Value) -> Document {
        Document {
            collection: "threads".into(),
            id: id.into(),
            fields: fields(value),
            created_at,
        }
    }

    #[test]
    fn nested_set_keeps_siblings() {
        let mut f = fields(json!({"unread": {"a": 1, "b": 2}}));
        Patch::new()
            .set(FieldPath::new(["unread", "a"]), 0)
            .apply(&mut f, 0);
        assert_eq!(Value::Object(f), json!({"unread": {"a": 0, "b": 2}}));
    }

    #[test]
    fn dotted_keys_are_single_segments() {
        let mut f = Fields::new();
        Patch::new()
            .increment(FieldPath::new(["unread", "jane.doe"]), 1)
            .apply(&mut f, 0);
        assert_eq!(f["unread"]["jane.doe"], json!(1));
    }

    #[test]
    fn increment_treats_missing_as_zero() {
        let mut f = fields(json!({"count": "oops"}));
        Patch::new()
            .increment("count", 2)
            .increment("other", 3)
            .apply(&mut f, 0);
        assert_eq!(f["count"], json!(2));
        assert_eq!(f["other"], json!(3));
    }

    #[test]
    fn server_timestamp_and_delete() {
        let mut f = fields(json!({"gone": true}));
        Patch::new()
            .server_timestamp("timestamp")
            .delete("gone")
            .apply(&mut f, 42);
        assert_eq!(Value::Object(f), json!({"timestamp": 42}));
    }

    #[test]
    fn preconditions_compare_exact_values() {
        let f = fields(json!({"offerStatus": "pending"}));
        assert!(Patch::new().expect("offerStatus", "pending").preconditions_hold(&f));
        assert!(!Patch::new().expect("offerStatus", "accepted").preconditions_hold(&f));
        assert!(!Patch::new().expect("missing", "x").preconditions_hold(&f));
    }

    #[test]
    fn array_contains_filter_and_descending_order() {
        let docs = vec![
            doc("t1", 1, json!({"participantIds": ["a", "b"], "timestamp": 10})),
            doc("t2", 2, json!({"participantIds": ["a", "c"], "timestamp": 30})),
            doc("t3", 3, json!({"participantIds": ["b", "c"], "timestamp": 20})),
        ];
        let query = Query::collection("threads")
            .filter(Filter::ArrayContains("participantIds".into(), json!("a")))
            .order_by("timestamp", Direction::Descending);
        let ids: Vec<_> = query.evaluate(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
    }

    #[test]
    fn ties_fall_back_to_creation_order() {
        let docs = vec![
            doc("late", 5, json!({"createdAt": 7})),
            doc("early", 4, json!({"createdAt": 7})),
        ];
        let query = Query::collection("threads").order_by("createdAt", Direction::Ascending);
        let ids: Vec<_> = query.evaluate(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn document_id_filter() {
        let query = Query::collection("threads").filter(Filter::DocumentId("t2".into()));
        assert!(query.matches(&doc("t2", 0, json!({}))));
        assert!(!query.matches(&doc("t1", 0, json!({}))));
    }
}
