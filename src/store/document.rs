//! Document Module
//!
//! Backend-neutral representation of a stored document and its typed fields.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::RecordReadError;

/// Field carrying the instant a pending user registered.
pub const REGISTRATION_TIME_FIELD: &str = "registrationTime";

// == Field Value ==
/// A single typed field value as held by the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Timestamp(DateTime<Utc>),
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Null,
    /// Any kind this service never reads (maps, arrays, references...)
    Other,
}

impl FieldValue {
    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::String(_) => "string",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Null => "null",
            FieldValue::Other => "other",
        }
    }
}

// == Document ==
/// One document of a collection: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier, unique within the collection
    pub id: String,
    /// Field name to value
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    /// Creates a document with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Creates a pending user record registered at `registered_at`.
    pub fn pending_user(id: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self::new(id).with_field(REGISTRATION_TIME_FIELD, FieldValue::Timestamp(registered_at))
    }

    /// Returns the document with `name` set to `value`.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    // == Registration Time ==
    /// Reads the registration instant as Unix milliseconds.
    ///
    /// Sub-millisecond precision is truncated. Fails if the field is absent
    /// or holds anything other than a timestamp.
    pub fn registration_time_ms(&self) -> Result<i64, RecordReadError> {
        match self.fields.get(REGISTRATION_TIME_FIELD) {
            Some(FieldValue::Timestamp(at)) => Ok(at.timestamp_millis()),
            Some(other) => Err(RecordReadError::NotATimestamp {
                field: REGISTRATION_TIME_FIELD,
                found: other.kind(),
            }),
            None => Err(RecordReadError::Missing(REGISTRATION_TIME_FIELD)),
        }
    }
}
