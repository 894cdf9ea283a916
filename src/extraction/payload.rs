//! Isolating and validating the JSON payload in a generated reply

use crate::family::FamilyData;
use serde_json::Value;
use thiserror::Error;

/// Why a reply could not be turned into family data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("no JSON object found in response")]
    NoPayloadFound,
    #[error("malformed JSON payload: {0}")]
    Malformed(String),
}

/// Substring from the first `{` to the last `}`, inclusive.
///
/// The service sometimes wraps the object in prose or code fences.
pub fn isolate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    raw.get(start..=end)
}

/// Parse a generated reply into family data.
///
/// Only a syntactically broken payload is an error; missing or mistyped
/// categories degrade to empty lists.
pub fn parse(raw: &str) -> Result<FamilyData, PayloadError> {
    let candidate = isolate(raw).ok_or(PayloadError::NoPayloadFound)?;
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| PayloadError::Malformed(e.to_string()))?;
    Ok(crate::family::from_value(&value))
}
