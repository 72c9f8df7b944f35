//! Pagination state and the derived view handed to renderers.

use crate::Record;
use serde::{Deserialize, Serialize};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page and page size.
///
/// Pages are 1-based. The page is kept within
/// `[1, max(1, ceil(total_items / page_size))]` by [`ViewState::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    /// First page with the given page size. A size of 0 becomes 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages needed for `total_items`; at least 1.
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size).max(1)
    }

    /// Pull the page back into range for `total_items`.
    pub fn clamp(&mut self, total_items: usize) {
        self.page = self.page.clamp(1, self.total_pages(total_items));
    }

    /// Index range of the current page within `total_items` rows.
    pub fn range(&self, total_items: usize) -> std::ops::Range<usize> {
        let start = (self.page - 1).saturating_mul(self.page_size).min(total_items);
        let end = start.saturating_add(self.page_size).min(total_items);
        start..end
    }
}

/// The visible slice of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Rows of the current page, in display order
    pub rows: Vec<Record>,
    /// Current page, 1-based
    pub page: usize,
    pub page_size: usize,
    /// Records passing search and filters, across all pages
    pub total_items: usize,
    pub total_pages: usize,
}

impl View {
    /// Slice the current page out of the full filtered, sorted rows.
    pub fn paginate(rows: &[&Record], state: ViewState) -> Self {
        let total_items = rows.len();
        let mut state = state;
        state.clamp(total_items);

        Self {
            rows: rows[state.range(total_items)]
                .iter()
                .map(|r| (*r).clone())
                .collect(),
            page: state.page,
            page_size: state.page_size,
            total_items,
            total_pages: state.total_pages(total_items),
        }
    }

    /// Whether a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first row shown, 0 when empty.
    ///
    /// Renderers use this for "Showing 11 to 20 of 57 entries".
    pub fn first_item(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based position of the last row shown, 0 when empty.
    pub fn last_item(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.first_item() + self.rows.len() - 1
        }
    }
}
