//! # Tabula Engine
//!
//! A generic tabular data engine for CRUD screens.
//!
//! This crate owns the logic every list-and-edit screen repeats: free-text
//! search, structured filters, sorting, pagination, row selection for bulk
//! actions, and export of the filtered view. Screens describe their columns
//! and hand over records; the engine derives what to show.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches files, network or storage
//! - **Derived view**: visible rows are recomputed from state on every read
//! - **Forgiving**: unknown ids are no-ops, bad pages are clamped, malformed
//!   criteria match nothing
//! - **Portable**: plain data in, plain data out, JSON at the edges
//!
//! ## Core Concepts
//!
//! ### Records and fields
//!
//! A [`Record`] is a flat JSON object with a required `id`. A
//! [`FieldDescriptor`] names a column, gives it a label and a [`FieldType`],
//! and says whether it can be sorted or searched.
//!
//! ### Filtering
//!
//! A [`Search`] term matches a record if any searchable field contains it,
//! ignoring case. A chain of [`FilterCriterion`] values is then evaluated
//! strictly left to right; `a AND b OR c` means `(a AND b) OR c`.
//!
//! ### Sorting and pages
//!
//! One [`SortSpec`] is active at a time. Sorting is stable, so equal rows keep
//! collection order. The [`View`] is one page of the result; pages are 1-based
//! and always clamped into range.
//!
//! ### Selection
//!
//! The [`SelectionSet`] survives search, filter, sort and page changes. Ids
//! are dropped from it when their records are removed.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula_engine::{
//!     FieldDescriptor, FilterCriterion, FilterOperator, Record, SortDirection,
//!     TabularEngine,
//! };
//! use serde_json::json;
//!
//! // 1. Describe the columns
//! let fields = vec![
//!     FieldDescriptor::string("name", "Name"),
//!     FieldDescriptor::boolean("active", "Active"),
//! ];
//!
//! // 2. Load records
//! let records = vec![
//!     Record::from_value(json!({"id": 1, "name": "Zeta", "active": true})).unwrap(),
//!     Record::from_value(json!({"id": 2, "name": "alpha", "active": false})).unwrap(),
//!     Record::from_value(json!({"id": 3, "name": "Beta", "active": true})).unwrap(),
//! ];
//! let mut engine = TabularEngine::with_records("accounts", fields, records);
//!
//! // 3. Sort and filter
//! engine.set_sort("name", SortDirection::Asc);
//! engine.set_criteria(vec![FilterCriterion::new(
//!     "active",
//!     FilterOperator::Equals,
//!     json!(true),
//! )]);
//!
//! // 4. Render the view
//! let view = engine.view();
//! assert_eq!(view.total_items, 2);
//! assert_eq!(view.rows[0].field("name"), Some(&json!("Beta")));
//! ```
//!
//! ## Commands
//!
//! Every operation also exists as a serializable [`Command`], applied with
//! [`TabularEngine::execute`]. The [`ffi`] module and the HTTP server speak
//! this vocabulary.
//!
//! ## Persistence
//!
//! Use [`TabularEngine::export_state`] and [`TabularEngine::import_state`]
//! with [`EngineSnapshot`] to save and restore a table.

pub mod command;
pub mod engine;
pub mod error;
pub mod export;
pub mod ffi;
pub mod field;
pub mod filter;
pub mod ids;
pub mod record;
pub mod selection;
pub mod snapshot;
pub mod sort;
pub mod value;
pub mod view;

// Re-export main types at crate root
pub use command::{Command, CommandOutcome};
pub use engine::TabularEngine;
pub use error::Error;
pub use export::{ExportFormat, ExportPayload};
pub use field::{FieldDescriptor, FieldType};
pub use filter::{FilterCriterion, FilterOperator, Joiner, Search};
pub use ids::IdAllocator;
pub use record::{Record, RecordId};
pub use selection::SelectionSet;
pub use snapshot::{EngineSnapshot, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};
pub use sort::{SortDirection, SortSpec};
pub use view::{View, ViewState, DEFAULT_PAGE_SIZE};

/// Field values of a record, keyed by field name.
pub type Fields = serde_json::Map<String, serde_json::Value>;
