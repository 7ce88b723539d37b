//! Model descriptor contract and a field-list implementation.
//!
//! # Responsibility
//! - Tell the store how to validate candidates and which field is unique.
//! - Tell the query engine which field names are eligible for filter/sort.
//!
//! # Invariants
//! - `collection_name()` names the backing file and never changes for a model.

use crate::model::record::{Record, ID_FIELD};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

/// Per-collection model contract consumed by the store and query engine.
pub trait ModelDescriptor {
    /// Singular type name, e.g. `Contact`.
    fn class_name(&self) -> &str;

    /// Validity predicate applied on every add/update.
    fn is_valid(&self, record: &Record) -> bool;

    /// Field whose value must be unique within the collection.
    fn key_field(&self) -> Option<&str> {
        None
    }

    /// Whether `name` is a recognized field for filtering and sorting.
    fn has_field(&self, name: &str) -> bool;

    /// Pluralized collection name used for the backing file.
    fn collection_name(&self) -> String {
        format!("{}s", self.class_name())
    }
}

type Predicate = Box<dyn Fn(&Record) -> bool + Send + Sync>;

/// Descriptor built from explicit field lists.
///
/// `is_valid` requires every required field to be present, non-null and
/// non-empty, then runs the optional custom predicate.
pub struct FieldModel {
    class_name: String,
    fields: BTreeSet<String>,
    required: Vec<String>,
    key_field: Option<String>,
    predicate: Option<Predicate>,
}

impl FieldModel {
    /// Creates a model recognizing `fields`. `Id` is always recognized.
    pub fn new<I, S>(class_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = fields.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        fields.insert(ID_FIELD.to_string());
        Self {
            class_name: class_name.into(),
            fields,
            required: Vec::new(),
            key_field: None,
            predicate: None,
        }
    }

    /// Declares fields every valid record must carry.
    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the uniqueness key field.
    pub fn with_key(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    /// Adds a custom validity predicate evaluated after the required-field check.
    pub fn with_validator(
        mut self,
        predicate: impl Fn(&Record) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }
}

impl Debug for FieldModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldModel")
            .field("class_name", &self.class_name)
            .field("fields", &self.fields)
            .field("required", &self.required)
            .field("key_field", &self.key_field)
            .field("has_validator", &self.predicate.is_some())
            .finish()
    }
}

impl ModelDescriptor for FieldModel {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn is_valid(&self, record: &Record) -> bool {
        let has_required = self.required.iter().all(|field| match record.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(_) => true,
        });
        has_required && self.predicate.as_ref().map_or(true, |check| check(record))
    }

    fn key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }
}
