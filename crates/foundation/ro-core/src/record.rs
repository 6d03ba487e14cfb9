//! Stored and normalized research object records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::creator::Creator;

/// Placeholder for a DOI or publication date that could not be found.
pub const NOT_FOUND: &str = "Not Found";

// ---------------------------------------------------------------
//  Stored shape
// ---------------------------------------------------------------

/// One entry of a record's publication status history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
}

impl StatusEntry {
    pub fn is_stage(&self, stage: &str) -> bool {
        self.stage.as_deref() == Some(stage)
    }
}

/// A research object as persisted, restricted to the projected fields.
///
/// `Status` and `Aggregation` are typed; every other top-level key
/// (`Repository` and whatever else a projection lets through) is kept in
/// `fields` in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "Status", default, deserialize_with = "null_as_default")]
    pub status: Vec<StatusEntry>,
    #[serde(rename = "Aggregation", default, deserialize_with = "null_as_default")]
    pub aggregation: Map<String, Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StoredRecord {
    pub fn from_json(value: Value) -> crate::Result<Self> {
        if !value.is_object() {
            return Err(crate::Error::InvalidRecord(format!(
                "expected a document, got {value}"
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn repository(&self) -> Option<&str> {
        self.fields.get("Repository").and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.aggregation.get("Title").and_then(Value::as_str)
    }

    /// The last status entry with the given stage.
    pub fn status_for(&self, stage: &str) -> Option<&StatusEntry> {
        self.status.iter().rev().find(|s| s.is_stage(stage))
    }
}

// ---------------------------------------------------------------
//  Client shape
// ---------------------------------------------------------------

/// A record as returned to clients.
///
/// `fields` holds the top-level keys with the aggregation flattened in. The
/// derived keys are serialized after them, in the order below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "CreatorName", default, skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<Creator>,
}

impl NormalizedRecord {
    /// The stored creator identifiers, before name resolution.
    pub fn creator(&self) -> Option<Creator> {
        self.fields.get("Creator").and_then(Creator::from_value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// ---------------------------------------------------------------
//  Lenient field readers
// ---------------------------------------------------------------

/// Accept any JSON for a text field: strings as-is, `{"$date": ..}`
/// extended JSON as its inner text, other scalars as JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_text(&v)))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("$date") {
            Some(inner) => value_text(inner),
            None => Some(value.to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
