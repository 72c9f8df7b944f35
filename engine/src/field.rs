//! Field descriptors.
//!
//! Descriptors tell the engine how a column may be searched, filtered and
//! sorted. They are supplied by the caller per screen; the engine never infers
//! them from data.

use serde::{Deserialize, Serialize};

/// Value types a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Date => write!(f, "date"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Describes one column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Field name as it appears in records
    pub name: String,
    /// Human-readable column label, used as the CSV header
    pub label: String,
    /// Value type, drives comparison
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the column may be sorted
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether free-text search looks at this column
    #[serde(default = "default_true")]
    pub filterable: bool,
}

impl FieldDescriptor {
    /// Create a sortable, filterable descriptor.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            sortable: true,
            filterable: true,
        }
    }

    /// Shorthand for a string column.
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::String)
    }

    /// Shorthand for a number column.
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Number)
    }

    /// Shorthand for a date column.
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Date)
    }

    /// Shorthand for a boolean column.
    pub fn boolean(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Boolean)
    }

    /// Builder-style method to exclude the column from sorting.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Builder-style method to exclude the column from free-text search.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }
}

/// Find the descriptor for a field name.
pub fn find<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|f| f.name == name)
}
