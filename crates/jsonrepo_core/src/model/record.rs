//! Open record shape.
//!
//! # Responsibility
//! - Wrap a JSON object as the unit of storage.
//! - Provide typed access to the store-owned `Id` and conflict marker.
//!
//! # Invariants
//! - Serializes as a plain JSON object (no wrapper).
//! - `Id` is only written by the collection store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store-assigned record identifier.
pub type RecordId = u64;

/// Field name holding the record identifier.
pub const ID_FIELD: &str = "Id";

/// Field name set on a candidate rejected by a key-field conflict.
pub const CONFLICT_FIELD: &str = "conflict";

/// One record of a collection: field name -> JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Converts a JSON value into a record.
    ///
    /// Returns `None` unless `value` is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the `Id` field when it holds a non-negative integer.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(Value::as_u64)
    }

    pub fn set_id(&mut self, id: RecordId) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets `field`, returning the previous value if any.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Attaches the conflict marker reported by a rejected add.
    pub fn mark_conflict(&mut self) {
        self.0.insert(CONFLICT_FIELD.to_string(), Value::Bool(true));
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.0.get(CONFLICT_FIELD), Some(Value::Bool(true)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        value.into_value()
    }
}
