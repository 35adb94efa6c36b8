//! Sortable, paginated view over an in-memory row collection
//!
//! `TableState` owns the rows, the column descriptors and the small amount
//! of interaction state (sort selection, current page, page size). Every call
//! to [`TableState::view`] sorts and slices from scratch; nothing about a
//! previous row collection is cached.

pub mod column;
pub mod row;
pub mod value;


use std::cmp::Ordering;
use thiserror::Error;

pub use column::{Align, Column};
pub use row::Row;
pub use value::Value;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("page size must be at least 1")]
    InvalidPageSize,
    #[error("page size options must all be at least 1 (got {0:?})")]
    InvalidPageSizeOption(Vec<usize>),
}

/// Paging configuration handed to [`TableState::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: vec![10, 25, 50, 100],
        }
    }
}

impl TableOptions {
    /// Reject zero sizes and make sure the initial size is selectable
    pub fn validate(mut self) -> Result<Self, TableError> {
        if self.page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        if self.page_size_options.contains(&0) {
            return Err(TableError::InvalidPageSizeOption(self.page_size_options));
        }
        if self.page_size_options.is_empty() {
            self.page_size_options = Self::default().page_size_options;
        }
        if !self.page_size_options.contains(&self.page_size) {
            tracing::warn!(
                "Page size {} is not among options {:?}, adding it",
                self.page_size,
                self.page_size_options
            );
            self.page_size_options.push(self.page_size);
        }

        self.page_size_options.sort_unstable();
        self.page_size_options.dedup();
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Adjust an ascending ordering for this direction
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Descending => ord.reverse(),
            SortDirection::Ascending | SortDirection::None => ord,
        }
    }
}

/// Active sort column and direction.
///
/// Fields are private: the key is `None` exactly when the direction is
/// `SortDirection::None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    key: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// inactive -> ascending -> descending -> inactive; a new key restarts at ascending
    fn toggle(&mut self, key: &str) {
        *self = match (self.key.as_deref(), self.direction) {
            (Some(current), SortDirection::Ascending) if current == key => Self {
                key: Some(key.to_string()),
                direction: SortDirection::Descending,
            },
            (Some(current), SortDirection::Descending) if current == key => Self::default(),
            _ => Self {
                key: Some(key.to_string()),
                direction: SortDirection::Ascending,
            },
        };
    }
}

pub struct TableState {
    rows: Vec<Row>,
    columns: Vec<Column>,
    sort: SortState,
    page: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
}

impl TableState {
    pub fn new(
        rows: Vec<Row>,
        columns: Vec<Column>,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        let options = options.validate()?;
        Ok(Self {
            rows,
            columns,
            sort: SortState::default(),
            page: 1,
            page_size: options.page_size,
            page_size_options: options.page_size_options,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Current page as stored; may be stale until the next `view()` if rows shrank
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Replace the row collection. Sort and page are kept; the page is
    /// clamped on the next view.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        tracing::debug!("Replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
    }

    /// Toggle sorting on the column with field `key`. Unknown or
    /// non-sortable keys are ignored.
    pub fn sort(&mut self, key: &str) {
        if !self.columns.iter().any(|c| c.sort_key() == Some(key)) {
            return;
        }
        self.sort.toggle(key);
        tracing::debug!("Sort is now {:?}", self.sort);
    }

    /// Toggle sorting on the column at `index` in display order
    pub fn sort_column(&mut self, index: usize) {
        let key = self
            .columns
            .get(index)
            .and_then(Column::sort_key)
            .map(str::to_string);
        if let Some(key) = key {
            self.sort(&key);
        }
    }

    /// Header indicator for `column`: neutral, up or down. `None` when not sortable.
    pub fn indicator(&self, column: &Column) -> Option<&'static str> {
        let key = column.sort_key()?;
        if self.sort.key() != Some(key) {
            return Some("⇅");
        }
        match self.sort.direction() {
            SortDirection::Ascending => Some("▲"),
            SortDirection::Descending => Some("▼"),
            SortDirection::None => Some("⇅"),
        }
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    fn last_page(&self) -> usize {
        self.page_count().max(1)
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.last_page());
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn previous(&mut self) {
        self.clamp_page();
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next(&mut self) {
        self.clamp_page();
        self.page = (self.page + 1).min(self.last_page());
    }

    pub fn last(&mut self) {
        self.page = self.last_page();
    }

    /// Jump to `page`, clamped into the valid range
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.last_page());
    }

    /// Select a page size from the allowed options. Always resets to page 1.
    /// Returns `false` (and changes nothing) for sizes not in the options.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !self.page_size_options.contains(&size) {
            return false;
        }
        self.page_size = size;
        self.page = 1;
        tracing::debug!("Page size set to {}", size);
        true
    }

    /// Step to the next larger (or smaller) page size, wrapping around
    pub fn cycle_page_size(&mut self, forward: bool) {
        let count = self.page_size_options.len();
        let current = self
            .page_size_options
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.set_page_size(self.page_size_options[next]);
    }

    /// Row indices in display order for the current sort
    pub fn sorted_indices(&self) -> Vec<usize> {
        let indices: Vec<usize> = (0..self.rows.len()).collect();
        let Some(key) = self.sort.key() else {
            return indices;
        };
        let direction = self.sort.direction();

        merge_sort(indices, &mut |a, b| {
            value::compare(self.rows[a].get(key), self.rows[b].get(key), direction)
        })
    }

    /// Sort, clamp the page and slice out the visible rows
    pub fn view(&mut self) -> PageView<'_> {
        self.clamp_page();

        let order = self.sorted_indices();
        let start = ((self.page - 1) * self.page_size).min(order.len());
        let end = (start + self.page_size).min(order.len());

        PageView {
            rows: order[start..end].iter().map(|&i| &self.rows[i]).collect(),
            page: self.page,
            page_count: self.page_count(),
            page_size: self.page_size,
            total_rows: self.rows.len(),
            offset: start,
        }
    }
}

/// Stable bottom-up merge sort over indices.
///
/// `slice::sort_by` may panic when the comparator is not a total order,
/// which the mixed-type fallback in `value::compare` does not guarantee.
fn merge_sort(items: Vec<usize>, cmp: &mut impl FnMut(usize, usize) -> Ordering) -> Vec<usize> {
    let n = items.len();
    let mut src = items;
    let mut buf = vec![0; n];
    let mut width = 1;

    while width < n {
        let mut start = 0;
        while start < n {
            let mid = (start + width).min(n);
            let end = (start + 2 * width).min(n);
            let (mut i, mut j, mut k) = (start, mid, start);

            while i < mid && j < end {
                if cmp(src[j], src[i]) == Ordering::Less {
                    buf[k] = src[j];
                    j += 1;
                } else {
                    buf[k] = src[i];
                    i += 1;
                }
                k += 1;
            }
            buf[k..k + (mid - i)].copy_from_slice(&src[i..mid]);
            k += mid - i;
            buf[k..k + (end - j)].copy_from_slice(&src[j..end]);

            start = end;
        }
        std::mem::swap(&mut src, &mut buf);
        width *= 2;
    }

    src
}

/// The visible page produced by [`TableState::view`]
#[derive(Debug)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Row>,
    pub page: usize,
    /// Zero for an empty collection
    pub page_count: usize,
    pub page_size: usize,
    pub total_rows: usize,
    /// Position of the first visible row in the sorted collection
    pub offset: usize,
}

impl PageView<'_> {
    /// Nothing to show: the table renders its "No results found" row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// "Page X of Y"; an empty collection still reads as one page
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.page_count.max(1))
    }
}
