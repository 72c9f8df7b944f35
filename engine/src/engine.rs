//! TabularEngine - the in-memory table behind a CRUD screen.
//!
//! The engine owns a collection of records plus the state a screen layers on
//! top of it: search term, filter criteria, sort, page and selection. The
//! visible rows are derived from that state on every read and never cached.

use crate::{
    error::Result,
    export::{self, ExportFormat, ExportPayload},
    filter::{self, FilterCriterion, Search},
    record::take_id,
    snapshot::{EngineSnapshot, SNAPSHOT_FORMAT_VERSION},
    Command, CommandOutcome, Error, FieldDescriptor, Fields, IdAllocator, Record, RecordId,
    SelectionSet, SortDirection, SortSpec, View, ViewState,
};
use chrono::NaiveDate;
use std::collections::HashSet;

/// A table of records with search, filter, sort, pagination and selection.
#[derive(Debug, Clone)]
pub struct TabularEngine {
    /// Table name, used as the export file stem
    name: String,
    /// Column descriptors
    fields: Vec<FieldDescriptor>,
    /// The full collection, in insertion order
    records: Vec<Record>,
    /// Active free-text search
    search: Search,
    /// Active criteria chain
    criteria: Vec<FilterCriterion>,
    /// Active sort
    sort: Option<SortSpec>,
    /// Page and page size
    view_state: ViewState,
    /// Checked rows
    selection: SelectionSet,
    /// Source of fresh ids
    ids: IdAllocator,
}

impl TabularEngine {
    /// Create an empty engine.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
            records: Vec::new(),
            search: Search::default(),
            criteria: Vec::new(),
            sort: None,
            view_state: ViewState::default(),
            selection: SelectionSet::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Create an engine populated with records.
    pub fn with_records(
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        records: Vec<Record>,
    ) -> Self {
        let mut engine = Self::new(name, fields);
        engine.load(records);
        engine
    }

    /// Builder-style method to set the initial page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.view_state = ViewState::new(page_size);
        self
    }

    /// Get the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column descriptors.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get the full collection, ignoring search and filters.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records in the full collection.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// The active search term, as entered.
    pub fn search_term(&self) -> &str {
        &self.search.term
    }

    /// The active criteria chain.
    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    /// The active sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.view_state.page
    }

    /// Current page size.
    pub fn page_size(&self) -> usize {
        self.view_state.page_size
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Replace the collection.
    ///
    /// Resets search, criteria and sort, returns to page 1 and clears the
    /// selection. The page size is kept. When ids repeat, the first record
    /// with that id wins.
    pub fn load(&mut self, records: Vec<Record>) {
        self.records.clear();
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            self.ids.observe(&record.id);
            self.records.push(record);
        }

        self.search = Search::default();
        self.criteria.clear();
        self.sort = None;
        self.view_state.page = 1;
        self.selection.clear();
    }

    /// Replace the collection from raw field maps.
    ///
    /// Rows may carry an `id`; rows without one get a fresh id. Fails without
    /// touching the engine if any `id` is not a string or integer.
    pub fn load_fields(&mut self, rows: Vec<Fields>) -> Result<()> {
        let mut parsed = Vec::with_capacity(rows.len());
        for mut fields in rows {
            let id = take_id(&mut fields)?;
            parsed.push((id, fields));
        }

        // Observe explicit ids first so allocated ones cannot collide
        for id in parsed.iter().filter_map(|(id, _)| id.as_ref()) {
            self.ids.observe(id);
        }

        let records = parsed
            .into_iter()
            .map(|(id, fields)| Record {
                id: id.unwrap_or_else(|| self.ids.allocate()),
                fields,
            })
            .collect();

        self.load(records);
        Ok(())
    }

    /// Append a record built from a field map.
    ///
    /// A missing `id` is assigned from the counter. The current page is not
    /// changed, so the new row may land on another page.
    pub fn add(&mut self, mut fields: Fields) -> Result<RecordId> {
        let id = match take_id(&mut fields)? {
            Some(id) => id,
            None => self.ids.allocate(),
        };
        self.add_record(Record { id, fields })
    }

    /// Append a record that already has an id.
    pub fn add_record(&mut self, record: Record) -> Result<RecordId> {
        if self.contains(&record.id) {
            return Err(Error::DuplicateId(record.id));
        }

        let id = record.id.clone();
        self.ids.observe(&id);
        self.records.push(record);
        self.clamp_page();
        Ok(id)
    }

    /// Merge fields into a record.
    ///
    /// Returns `false`, changing nothing, if the id does not exist.
    pub fn update(&mut self, id: &RecordId, partial: Fields) -> bool {
        let record = match self.records.iter_mut().find(|r| &r.id == id) {
            Some(r) => r,
            None => return false,
        };

        record.merge(partial);
        self.clamp_page();
        true
    }

    /// Delete a record. Returns `false` if the id does not exist.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        let index = match self.records.iter().position(|r| &r.id == id) {
            Some(i) => i,
            None => return false,
        };

        self.records.remove(index);
        self.selection.remove(id);
        self.clamp_page();
        true
    }

    /// Delete several records. Returns how many existed.
    pub fn remove_many(&mut self, ids: &[RecordId]) -> usize {
        let targets: HashSet<&RecordId> = ids.iter().collect();
        let before = self.records.len();

        self.records.retain(|r| !targets.contains(&r.id));
        self.selection.retain(|id| !targets.contains(id));
        self.clamp_page();

        before - self.records.len()
    }

    /// Delete every selected record. Returns how many were deleted.
    pub fn remove_selected(&mut self) -> usize {
        let ids: Vec<RecordId> = self.selection.iter().cloned().collect();
        self.remove_many(&ids)
    }

    // ------------------------------------------------------------------
    // Search, filter, sort
    // ------------------------------------------------------------------

    /// Search the `filterable` fields among `fields` for `term`.
    ///
    /// A blank term clears the search. Returns to page 1.
    pub fn set_search_term(&mut self, term: &str, fields: &[FieldDescriptor]) {
        self.search = Search::new(term, fields);
        self.view_state.page = 1;
    }

    /// Search the engine's own `filterable` fields for `term`.
    pub fn search(&mut self, term: &str) {
        self.search = Search::new(term, &self.fields);
        self.view_state.page = 1;
    }

    /// Replace the criteria chain. Returns to page 1.
    pub fn set_criteria(&mut self, criteria: Vec<FilterCriterion>) {
        self.criteria = criteria;
        self.view_state.page = 1;
    }

    /// Drop both the search and the criteria. Returns to page 1.
    pub fn clear_filters(&mut self) {
        self.search = Search::default();
        self.criteria.clear();
        self.view_state.page = 1;
    }

    /// Replace the active sort. The page is kept.
    pub fn set_sort(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.sort = Some(SortSpec::new(field, direction));
    }

    /// Sort by `field`, flipping the direction if it is already the sort
    /// field and starting ascending otherwise. Returns the new direction.
    pub fn toggle_sort(&mut self, field: &str) -> SortDirection {
        let direction = match &self.sort {
            Some(spec) if spec.field == field => spec.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.set_sort(field, direction);
        direction
    }

    /// Remove the sort; rows return to collection order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Go to a page, clamped into `[1, total_pages]`.
    pub fn set_page(&mut self, page: usize) {
        self.view_state.page = page;
        self.clamp_page();
    }

    /// Go to the next page, if any.
    pub fn next_page(&mut self) {
        self.set_page(self.view_state.page.saturating_add(1));
    }

    /// Go to the previous page, if any.
    pub fn previous_page(&mut self) {
        self.set_page(self.view_state.page.saturating_sub(1));
    }

    /// Change the page size. Returns to page 1; a size of 0 becomes 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.view_state = ViewState::new(page_size);
    }

    fn clamp_page(&mut self) {
        let total = self.total_items();
        self.view_state.clamp(total);
    }

    // ------------------------------------------------------------------
    // Derived view
    // ------------------------------------------------------------------

    fn passes(&self, record: &Record) -> bool {
        self.search.matches(record) && filter::matches_all(&self.criteria, record, &self.fields)
    }

    /// Number of records passing search and criteria.
    pub fn total_items(&self) -> usize {
        self.records.iter().filter(|r| self.passes(r)).count()
    }

    /// Records passing search and criteria, in sort order, across all pages.
    pub fn filtered_records(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().filter(|r| self.passes(r)).collect();
        if let Some(sort) = &self.sort {
            sort.apply(&mut rows, &self.fields);
        }
        rows
    }

    /// The current page of the filtered, sorted records.
    pub fn view(&self) -> View {
        View::paginate(&self.filtered_records(), self.view_state)
    }

    /// Ids of the rows on the current page.
    pub fn visible_ids(&self) -> Vec<RecordId> {
        let rows = self.filtered_records();
        let mut state = self.view_state;
        state.clamp(rows.len());
        rows[state.range(rows.len())]
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Check or uncheck one row. Returns `false` for an unknown id.
    pub fn toggle_selection(&mut self, id: &RecordId, included: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.set(id.clone(), included);
        true
    }

    /// Check or uncheck every row on the current page.
    ///
    /// Rows on other pages keep their state.
    pub fn select_all_visible(&mut self, included: bool) {
        for id in self.visible_ids() {
            self.selection.set(id, included);
        }
    }

    /// Uncheck everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.contains(id)
    }

    /// Number of selected rows.
    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    /// The selection set.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Selected ids, in id order.
    pub fn selected_ids(&self) -> Vec<RecordId> {
        self.selection.iter().cloned().collect()
    }

    /// Selected records, in collection order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| self.selection.contains(&r.id))
            .collect()
    }

    /// Whether the current page is non-empty and fully selected.
    ///
    /// Drives the state of a "select all" header checkbox.
    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible_ids();
        !visible.is_empty() && visible.iter().all(|id| self.selection.contains(id))
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Serialize every row passing search and criteria, ignoring pagination.
    pub fn export_view(&self, format: ExportFormat) -> Result<ExportPayload> {
        export::export(&self.name, format, &self.fields, &self.filtered_records(), None)
    }

    /// Like [`TabularEngine::export_view`], with the date in the filename.
    pub fn export_view_dated(&self, format: ExportFormat, date: NaiveDate) -> Result<ExportPayload> {
        export::export(
            &self.name,
            format,
            &self.fields,
            &self.filtered_records(),
            Some(date),
        )
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply a command and report the outcome with the resulting view.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        let mut outcome = CommandOutcome::applied();

        match command {
            Command::Load { records } => self.load_fields(records)?,
            Command::SetSearchTerm { term, fields } => match fields {
                Some(fields) => self.set_search_term(&term, &fields),
                None => self.search(&term),
            },
            Command::SetCriteria { criteria } => self.set_criteria(criteria),
            Command::ClearFilters => self.clear_filters(),
            Command::SetSort { field, direction } => self.set_sort(field, direction),
            Command::ToggleSort { field } => {
                self.toggle_sort(&field);
            }
            Command::ClearSort => self.clear_sort(),
            Command::SetPage { page } => self.set_page(page),
            Command::SetPageSize { page_size } => self.set_page_size(page_size),
            Command::Add { record } => outcome.id = Some(self.add(record)?),
            Command::Update { id, fields } => {
                outcome.applied = self.update(&id, fields);
                outcome.id = Some(id);
            }
            Command::Remove { id } => {
                outcome.applied = self.remove(&id);
                outcome.removed = Some(usize::from(outcome.applied));
                outcome.id = Some(id);
            }
            Command::RemoveMany { ids } => {
                let removed = self.remove_many(&ids);
                outcome.applied = removed > 0;
                outcome.removed = Some(removed);
            }
            Command::RemoveSelected => {
                let removed = self.remove_selected();
                outcome.applied = removed > 0;
                outcome.removed = Some(removed);
            }
            Command::ToggleSelection { id, included } => {
                outcome.applied = self.toggle_selection(&id, included);
                outcome.id = Some(id);
            }
            Command::SelectAllVisible { included } => self.select_all_visible(included),
            Command::ClearSelection => self.clear_selection(),
        }

        outcome.selected = self.selected_ids();
        outcome.view = self.view();
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Capture the complete engine state.
    pub fn export_state(&self) -> EngineSnapshot {
        EngineSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            name: self.name.clone(),
            fields: self.fields.clone(),
            records: self.records.clone(),
            search_term: self.search.term.clone(),
            search_fields: self.search.fields.clone(),
            criteria: self.criteria.clone(),
            sort: self.sort.clone(),
            page: self.view_state.page,
            page_size: self.view_state.page_size,
            selection: self.selection.clone(),
            next_id: self.ids.peek(),
        }
    }

    /// Replace the complete engine state with a snapshot.
    ///
    /// The id counter never moves backwards, stale selection ids are dropped
    /// and the page is clamped.
    pub fn import_state(&mut self, snapshot: EngineSnapshot) -> Result<()> {
        snapshot.validate()?;

        let mut ids = IdAllocator::starting_at(snapshot.next_id);
        ids.merge(&self.ids);
        for record in &snapshot.records {
            ids.observe(&record.id);
        }

        self.name = snapshot.name;
        self.fields = snapshot.fields;
        self.records = snapshot.records;
        self.search = Search {
            term: snapshot.search_term,
            fields: snapshot.search_fields,
        };
        self.criteria = snapshot.criteria;
        self.sort = snapshot.sort;
        self.view_state = ViewState {
            page: snapshot.page,
            page_size: snapshot.page_size.max(1),
        };
        self.ids = ids;

        let existing: HashSet<&RecordId> = self.records.iter().map(|r| &r.id).collect();
        let mut selection = snapshot.selection;
        selection.retain(|id| existing.contains(id));
        self.selection = selection;

        self.clamp_page();
        Ok(())
    }

    /// Build an engine from a snapshot.
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self> {
        let mut engine = Self::new(snapshot.name.clone(), Vec::new());
        engine.import_state(snapshot)?;
        Ok(engine)
    }
}
