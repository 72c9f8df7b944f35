//! Commands for driving an engine through a serialized boundary.
//!
//! Every engine operation has a command form, so FFI callers and the HTTP
//! server can share one JSON vocabulary:
//!
//! ```json
//! {"type": "setSort", "field": "name", "direction": "desc"}
//! {"type": "toggleSelection", "id": 7, "included": true}
//! ```

use crate::{
    FieldDescriptor, Fields, FilterCriterion, RecordId, SortDirection, View, ViewState,
};
use serde::{Deserialize, Serialize};

/// A single engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Replace the collection and reset view state
    Load { records: Vec<Fields> },
    /// Set the free-text search; `fields` defaults to the engine's own
    SetSearchTerm {
        term: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<FieldDescriptor>>,
    },
    SetCriteria { criteria: Vec<FilterCriterion> },
    ClearFilters,
    SetSort {
        field: String,
        #[serde(default)]
        direction: SortDirection,
    },
    ToggleSort { field: String },
    ClearSort,
    SetPage { page: usize },
    SetPageSize { page_size: usize },
    Add { record: Fields },
    Update { id: RecordId, fields: Fields },
    Remove { id: RecordId },
    RemoveMany { ids: Vec<RecordId> },
    RemoveSelected,
    ToggleSelection { id: RecordId, included: bool },
    SelectAllVisible { included: bool },
    ClearSelection,
}

impl Command {
    /// Wire name of the command, as used in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load { .. } => "load",
            Command::SetSearchTerm { .. } => "setSearchTerm",
            Command::SetCriteria { .. } => "setCriteria",
            Command::ClearFilters => "clearFilters",
            Command::SetSort { .. } => "setSort",
            Command::ToggleSort { .. } => "toggleSort",
            Command::ClearSort => "clearSort",
            Command::SetPage { .. } => "setPage",
            Command::SetPageSize { .. } => "setPageSize",
            Command::Add { .. } => "add",
            Command::Update { .. } => "update",
            Command::Remove { .. } => "remove",
            Command::RemoveMany { .. } => "removeMany",
            Command::RemoveSelected => "removeSelected",
            Command::ToggleSelection { .. } => "toggleSelection",
            Command::SelectAllVisible { .. } => "selectAllVisible",
            Command::ClearSelection => "clearSelection",
        }
    }

    /// Whether the command can change the collection itself.
    pub fn mutates_records(&self) -> bool {
        matches!(
            self,
            Command::Load { .. }
                | Command::Add { .. }
                | Command::Update { .. }
                | Command::Remove { .. }
                | Command::RemoveMany { .. }
                | Command::RemoveSelected
        )
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// False when the command targeted something that does not exist
    pub applied: bool,
    /// Id the command created or targeted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Number of records deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
    /// Selected ids after the command
    #[serde(default)]
    pub selected: Vec<RecordId>,
    /// View after the command
    pub view: View,
}

impl CommandOutcome {
    pub(crate) fn applied() -> Self {
        Self {
            applied: true,
            id: None,
            removed: None,
            selected: Vec::new(),
            view: View::paginate(&[], ViewState::default()),
        }
    }
}
