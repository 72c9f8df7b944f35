//! Record types for tabular data.

use crate::{error::Result, Error, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Unique identifier of a record.
///
/// Ids are either integers or strings. The two never compare equal, so
/// `1` and `"1"` are distinct records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Interpret a JSON value as a record id.
    ///
    /// Returns `None` for anything other than an integer or a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Number),
            Value::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// The id as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Number(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Number(n.into())
    }
}

impl From<u32> for RecordId {
    fn from(n: u32) -> Self {
        RecordId::Number(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

/// One row of schema-free tabular data.
///
/// Serialized as a flat object: `{"id": 1, "name": "Acme Corp", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier for this record
    pub id: RecordId,
    /// Field values by name, excluding the id
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Create a new record.
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object that carries its own `id`.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidRecord(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };

        let id = match take_id(&mut fields)? {
            Some(id) => id,
            None => return Err(Error::InvalidRecord("missing id".into())),
        };

        Ok(Self { id, fields })
    }

    /// Get a field value.
    ///
    /// The pseudo-field `id` resolves to the record id.
    pub fn get(&self, field: &str) -> Option<Cow<'_, Value>> {
        if field == "id" {
            return Some(Cow::Owned(self.id.to_value()));
        }
        self.fields.get(field).map(Cow::Borrowed)
    }

    /// Get a field value by reference, without resolving `id`.
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Shallow-merge fields into this record.
    ///
    /// An `id` key in `partial` is ignored; ids are immutable.
    pub fn merge(&mut self, partial: Fields) {
        for (key, value) in partial {
            if key == "id" {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}

/// Remove and parse the `id` key of a field map.
///
/// `Ok(None)` means no id was present (or it was null).
pub(crate) fn take_id(fields: &mut Fields) -> Result<Option<RecordId>> {
    match fields.remove("id") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => RecordId::from_value(&value).map(Some).ok_or_else(|| {
            Error::InvalidRecord(format!("id must be a string or integer, got {}", value))
        }),
    }
}
