//! Known-key filter for untrusted family data
//!
//! Used for both extraction payloads and restored snapshots: only the four
//! known categories are read, only when they are sequences, and elements
//! that don't fit the category's record shape are dropped one by one.

use super::{FamilyData, FamilyMember};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const CATEGORIES: [&str; 4] = ["family_members", "relationships", "dynamics", "events"];

/// Build `FamilyData` from arbitrary JSON. Never fails.
pub fn from_value(value: &Value) -> FamilyData {
    let Some(map) = value.as_object() else {
        tracing::debug!("Family data is not an object, using empty record");
        return FamilyData::default();
    };

    for key in map.keys() {
        if !CATEGORIES.contains(&key.as_str()) {
            tracing::debug!(key = %key, "Ignoring unknown family data key");
        }
    }

    FamilyData {
        family_members: read_members(map),
        relationships: read_sequence(map, "relationships"),
        dynamics: read_sequence(map, "dynamics"),
        events: read_sequence(map, "events"),
    }
}

/// Members whose every field was unreadable carry nothing to merge
fn read_members(map: &Map<String, Value>) -> Vec<FamilyMember> {
    read_sequence::<FamilyMember>(map, "family_members")
        .into_iter()
        .filter(|member| {
            if member.is_blank() {
                tracing::debug!("Dropping family member with no readable fields");
            }
            !member.is_blank()
        })
        .collect()
}

fn read_sequence<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    let items = match map.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            tracing::debug!(category = key, "Category is not a sequence, using empty list");
            return Vec::new();
        }
        None => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(category = key, error = %e, "Dropping malformed element");
                None
            }
        })
        .collect()
}
