//! Row selection for bulk actions.

use crate::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids of the rows a user has checked.
///
/// The set itself knows nothing about the collection; the engine purges ids
/// whenever records are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or exclude one id. Returns whether the set changed.
    pub fn set(&mut self, id: RecordId, included: bool) -> bool {
        if included {
            self.ids.insert(id)
        } else {
            self.ids.remove(&id)
        }
    }

    /// Remove one id. Returns whether it was selected.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        self.ids.remove(id)
    }

    /// Whether an id is selected.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&RecordId) -> bool) {
        self.ids.retain(keep);
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate selected ids in id order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }
}
