//! Family record types
//!
//! Every type here deserializes leniently: the JSON comes from a
//! text-generation service or an untrusted snapshot, so odd field values
//! degrade to "absent" instead of rejecting the whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// A person in the family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_text"
    )]
    pub role: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_text"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_age"
    )]
    pub age: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "text_set"
    )]
    pub attributes: BTreeSet<String>,
}

impl FamilyMember {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    #[must_use]
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into());
        self
    }

    /// Nothing readable survived parsing
    pub fn is_blank(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.age.is_none() && self.attributes.is_empty()
    }

    /// Fold another record about the same person into this one.
    ///
    /// Scalars are first-write-wins; attributes accumulate.
    pub fn absorb(&mut self, incoming: FamilyMember) {
        let FamilyMember {
            role,
            name,
            age,
            attributes,
        } = incoming;

        if self.role.is_none() {
            self.role = role;
        }
        if self.name.is_none() {
            self.name = name;
        }
        if self.age.is_none() {
            self.age = age;
        }
        self.attributes.extend(attributes);
    }

    /// Human-readable label: "Name (role)", "Name", or "role"
    pub fn label(&self) -> String {
        match (&self.name, &self.role) {
            (Some(name), Some(role)) => format!("{name} ({role})"),
            (Some(name), None) => name.clone(),
            (None, Some(role)) => role.clone(),
            (None, None) => "unnamed family member".to_string(),
        }
    }
}

/// A connection between family members, e.g. a marriage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "text_list")]
    pub members: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_text"
    )]
    pub quality: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_text"
    )]
    pub duration: Option<String>,
}

/// A recurring pattern of interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dynamic {
    #[serde(rename = "type")]
    pub kind: String,
    pub pattern: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_text_list"
    )]
    pub members: Option<Vec<String>>,
}

/// A significant family event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_text_list"
    )]
    pub members: Option<Vec<String>>,
}

/// The structured family record for one conversation.
///
/// All four sequences are always present. Deserialization goes through
/// [`super::filter::from_value`], so unknown keys and non-sequence values
/// never make it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct FamilyData {
    pub family_members: Vec<FamilyMember>,
    pub relationships: Vec<Relationship>,
    pub dynamics: Vec<Dynamic>,
    pub events: Vec<Event>,
}

impl FamilyData {
    pub fn is_empty(&self) -> bool {
        self.family_members.is_empty()
            && self.relationships.is_empty()
            && self.dynamics.is_empty()
            && self.events.is_empty()
    }

    /// Total number of records across all categories
    pub fn record_count(&self) -> usize {
        self.family_members.len() + self.relationships.len() + self.dynamics.len() + self.events.len()
    }
}

impl From<Value> for FamilyData {
    fn from(value: Value) -> Self {
        super::filter::from_value(&value)
    }
}

// ============================================================================
// Lenient field readers
// ============================================================================

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    })
}

/// Age in whole years. Fractional ages (a toddler at 2.5) truncate toward
/// zero; negative, non-finite, or non-numeric values are absent.
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().and_then(whole_years),
        Value::String(s) => s.trim().parse().ok().and_then(whole_years),
        _ => None,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_years(age: f64) -> Option<u32> {
    (age.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&age)).then(|| age.trunc() as u32)
}

fn text_items(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => vec![Value::String(s)],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_items(Value::deserialize(deserializer)?))
}

fn optional_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(text_items(other)),
    })
}

fn text_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_items(Value::deserialize(deserializer)?)
        .into_iter()
        .collect())
}
