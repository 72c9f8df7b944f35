//! Snapshot types for saving and restoring engine state.
//!
//! A snapshot captures everything a screen needs to come back exactly as it
//! was: records, search, criteria, sort, page, selection and the id counter.
//! Where the snapshot is kept is up to the caller.

use crate::{error::Result, Error, FieldDescriptor, FilterCriterion, Record, RecordId, SelectionSet, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of an engine.
///
/// Records keep collection order; the selection serializes in id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub records: Vec<Record>,
    #[serde(default)]
    pub search_term: String,
    /// Fields the search term applies to
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<FilterCriterion>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub selection: SelectionSet,
    /// Next id the counter hands out
    pub next_id: i64,
}

impl EngineSnapshot {
    /// Number of records in the snapshot.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Check the snapshot can be imported.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let mut seen: HashSet<&RecordId> = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(&record.id) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate record id: {}",
                    record.id
                )));
            }
        }

        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Summary of a snapshot, without the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub name: String,
    pub record_count: usize,
    pub selected_count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl From<&EngineSnapshot> for SnapshotMetadata {
    fn from(snapshot: &EngineSnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            name: snapshot.name.clone(),
            record_count: snapshot.record_count(),
            selected_count: snapshot.selection.len(),
            page: snapshot.page,
            page_size: snapshot.page_size,
        }
    }
}
