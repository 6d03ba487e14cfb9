//! The `Creator` field of an aggregation.
//!
//! Stored records hold either one creator identifier or a list of them. The
//! shape is kept all the way to the response: a single `Creator` produces a
//! single `CreatorName`, a list produces a list of the same length.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker separating a display label from a profile URL in an identifier,
/// e.g. `"Jane Doe : http://vivo.example.org/individual/n123"`.
const PROFILE_ANNOTATION: &str = ": http";

/// One creator or many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    Single(String),
    Multiple(Vec<String>),
}

impl Creator {
    /// Read a creator out of a loosely typed JSON value.
    ///
    /// Non-string list elements are kept as their JSON text so the list
    /// length never changes. Returns `None` for null, objects and other
    /// scalars.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Creator::Single(s.clone())),
            Value::Array(items) => Some(Creator::Multiple(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// All identifiers, in stored order.
    pub fn identifiers(&self) -> &[String] {
        match self {
            Creator::Single(id) => std::slice::from_ref(id),
            Creator::Multiple(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.identifiers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers().is_empty()
    }

    /// True if any identifier satisfies `pred`.
    pub fn any(&self, pred: impl FnMut(&String) -> bool) -> bool {
        self.identifiers().iter().any(pred)
    }

    /// Rebuild with the same cardinality from already mapped values.
    ///
    /// `values` must hold one entry per identifier; a `Single` takes the
    /// first one.
    pub fn with_values(&self, mut values: Vec<String>) -> Creator {
        match self {
            Creator::Single(_) => Creator::Single(if values.is_empty() {
                String::new()
            } else {
                values.swap_remove(0)
            }),
            Creator::Multiple(_) => Creator::Multiple(values),
        }
    }
}

impl From<Creator> for Value {
    fn from(creator: Creator) -> Self {
        match creator {
            Creator::Single(s) => Value::String(s),
            Creator::Multiple(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }
}

/// Drop a trailing `": http..."` profile annotation from an identifier.
///
/// Used as the display fallback when the directory has no profile.
pub fn strip_profile_annotation(identifier: &str) -> String {
    match identifier.find(PROFILE_ANNOTATION) {
        Some(idx) => identifier[..idx].trim().to_string(),
        None => identifier.to_string(),
    }
}
