//! Payload: the fields an edit touches.
//!
//! A payload is a partial update, not a full row. Merging two payloads is the
//! field-level last-write-wins rule: the newer payload's fields overwrite the
//! older one's, untouched fields survive.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered map of field name to new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Last-write-wins merge: `newer`'s fields overwrite ours.
    pub fn merged_with(mut self, newer: &Payload) -> Payload {
        for (field, value) in newer.iter() {
            self.0.insert(field.clone(), value.clone());
        }
        self
    }

    /// True when every field of `self` is present in `other` with an equal
    /// value.
    pub fn is_subset_of(&self, other: &Payload) -> bool {
        self.iter().all(|(field, value)| other.get(field) == Some(value))
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Payload {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_is_last_write_wins_per_field() {
        let older = Payload::new()
            .with("title", json!("draft"))
            .with("status", json!("todo"));
        let newer = Payload::new().with("title", json!("final"));

        let merged = older.merged_with(&newer);

        // newer's field wins, untouched field survives
        assert_eq!(merged.get("title"), Some(&json!("final")));
        assert_eq!(merged.get("status"), Some(&json!("todo")));
    }

    #[test]
    fn subset_detects_no_op_supersede() {
        let in_flight = Payload::new()
            .with("title", json!("A"))
            .with("status", json!("doing"));
        let duplicate = Payload::new().with("title", json!("A"));
        let conflicting = Payload::new().with("title", json!("B"));

        assert!(duplicate.is_subset_of(&in_flight));
        assert!(!conflicting.is_subset_of(&in_flight));
        assert!(Payload::new().is_subset_of(&in_flight));
    }

    #[test]
    fn payload_serializes_as_plain_object() {
        let p = Payload::new().with("title", json!("A"));
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, json!({"title": "A"}));
    }
}
