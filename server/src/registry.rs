//! Registry of named tables.
//!
//! Each table is an engine behind its own async mutex. A request locks one
//! table, runs one engine operation to completion and releases it, so every
//! operation is atomic with respect to concurrent requests.

use std::path::Path;
use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use tabula_engine::{FieldDescriptor, Fields, TabularEngine};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

/// A table shared between requests.
pub type SharedTable = Arc<Mutex<TabularEngine>>;

/// Definition of a table to create.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub records: Vec<Fields>,
    /// Overrides the configured default page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

/// Listing entry for a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub name: String,
    pub total_records: usize,
}

/// Holds every live table, keyed by name.
#[derive(Debug)]
pub struct TableRegistry {
    tables: DashMap<String, SharedTable>,
    default_page_size: usize,
}

impl TableRegistry {
    /// Create an empty registry.
    pub fn new(default_page_size: usize) -> Self {
        Self {
            tables: DashMap::new(),
            default_page_size: default_page_size.max(1),
        }
    }

    /// Create an empty registry wrapped in Arc for sharing.
    pub fn new_shared(default_page_size: usize) -> Arc<Self> {
        Arc::new(Self::new(default_page_size))
    }

    /// Create a table.
    ///
    /// Fails with `Conflict` if the name is taken, or with an engine error if
    /// a record carries an invalid id. Names end up in export filenames, so
    /// quotes, backslashes and control characters are rejected.
    pub fn create(&self, definition: TableDefinition) -> Result<TableSummary> {
        let name = definition.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("table name must not be empty".into()));
        }
        if name.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
            return Err(AppError::BadRequest(format!(
                "table name contains an invalid character: {:?}",
                name
            )));
        }

        let page_size = definition.page_size.unwrap_or(self.default_page_size);
        let mut engine = TabularEngine::new(name.clone(), definition.fields).with_page_size(page_size);
        engine.load_fields(definition.records)?;

        let summary = TableSummary {
            name: name.clone(),
            total_records: engine.len(),
        };

        match self.tables.entry(name) {
            Entry::Occupied(entry) => Err(AppError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(engine)));
                tracing::info!(table = %summary.name, records = summary.total_records, "Table created");
                Ok(summary)
            }
        }
    }

    /// Look up a table.
    pub fn get(&self, name: &str) -> Result<SharedTable> {
        self.tables
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    /// Drop a table.
    pub fn remove(&self, name: &str) -> Result<()> {
        match self.tables.remove(name) {
            Some(_) => {
                tracing::info!(table = %name, "Table removed");
                Ok(())
            }
            None => Err(AppError::NotFound(name.to_string())),
        }
    }

    /// Summaries of every table, sorted by name.
    pub async fn list(&self) -> Vec<TableSummary> {
        // Collect handles first so no map guard is held across an await
        let tables: Vec<(String, SharedTable)> = self
            .tables
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut summaries = Vec::with_capacity(tables.len());
        for (name, table) in tables {
            let total_records = table.lock().await.len();
            summaries.push(TableSummary {
                name,
                total_records,
            });
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Number of live tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Create every table listed in a JSON seed file.
    ///
    /// The file holds an array of table definitions. Returns how many tables
    /// were created.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let definitions: Vec<TableDefinition> = serde_json::from_str(&raw)
            .map_err(|e| AppError::BadRequest(format!("invalid seed file: {}", e)))?;

        let count = definitions.len();
        for definition in definitions {
            self.create(definition)?;
        }

        tracing::info!(path = %path.display(), tables = count, "Seeded tables");
        Ok(count)
    }
}
