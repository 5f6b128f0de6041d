//! Navigation state of a table session

use tabview_core::{FetchOptions, SortDirection, SortSpec, TableKind, TableRef};
use tabview_filter::FilterCondition;

/// Everything a session needs to reproduce its current fetch.
///
/// Owned by exactly one [`crate::TableSession`]. Switching to another table
/// goes through [`QueryState::reset_for`], which is the only place the
/// state is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    table: Option<TableRef>,
    table_kind: Option<TableKind>,
    limit: usize,
    offset: usize,
    sort: Option<SortSpec>,
    filter: Option<FilterCondition>,
    cached_total_rows: Option<u64>,
    include_oid: bool,
}

impl QueryState {
    pub fn new(limit: usize) -> Self {
        Self {
            table: None,
            table_kind: None,
            limit,
            offset: 0,
            sort: None,
            filter: None,
            cached_total_rows: None,
            include_oid: false,
        }
    }

    /// Returns true if `table` is the table this state belongs to
    pub fn is_for(&self, table: &TableRef) -> bool {
        self.table.as_ref() == Some(table)
    }

    /// Start over for `table`, keeping only the page size
    pub fn reset_for(&mut self, table: TableRef) {
        *self = Self {
            table: Some(table),
            ..Self::new(self.limit)
        };
    }

    pub fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    pub fn table_kind(&self) -> Option<&TableKind> {
        self.table_kind.as_ref()
    }

    pub fn set_table_kind(&mut self, kind: TableKind) {
        self.table_kind = Some(kind);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Move forward one page
    pub fn advance(&mut self) {
        self.offset += self.limit;
    }

    /// Move back one page. Returns false, leaving the offset alone, when
    /// that would go before the first row.
    pub fn retreat(&mut self) -> bool {
        match self.offset.checked_sub(self.limit) {
            Some(offset) => {
                self.offset = offset;
                true
            }
            None => false,
        }
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Current direction of `column`; any column other than the sorted one
    /// is unsorted
    pub fn sort_direction_for(&self, column: &str) -> SortDirection {
        match &self.sort {
            Some(sort) if sort.column == column => sort.direction,
            _ => SortDirection::None,
        }
    }

    /// Replace the sort. [`SortDirection::None`] clears it.
    pub fn set_sort(&mut self, column: impl Into<String>, direction: SortDirection) {
        self.sort = match direction {
            SortDirection::None => None,
            direction => Some(SortSpec {
                column: column.into(),
                direction,
            }),
        };
    }

    pub fn filter(&self) -> Option<&FilterCondition> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, condition: FilterCondition) {
        self.filter = Some(condition);
    }

    pub fn clear_filter(&mut self) -> Option<FilterCondition> {
        self.filter.take()
    }

    pub fn cached_total_rows(&self) -> Option<u64> {
        self.cached_total_rows
    }

    pub fn cache_total_rows(&mut self, total: u64) {
        self.cached_total_rows = Some(total);
    }

    pub fn include_oid(&self) -> bool {
        self.include_oid
    }

    pub fn set_include_oid(&mut self, include_oid: bool) {
        self.include_oid = include_oid;
    }

    /// Options for the next `get_rows` call
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            sort: self.sort.clone(),
            conditions: self
                .filter
                .iter()
                .map(|condition| condition.predicate().to_string())
                .collect(),
            with_oid: self.include_oid,
        }
    }
}
