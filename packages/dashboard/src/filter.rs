//! Table filters, pagination, and the selection state that owns them.

use mls_locator_point_models::{District, PointRecord, PointStatus};

/// Fixed number of table rows per page.
pub const PAGE_SIZE: usize = 25;

/// Active table filters. An empty/absent value matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Case-insensitive substring of the point code or name.
    pub search: String,
    pub status: Option<PointStatus>,
    /// Exact mandal name.
    pub mandal: Option<String>,
}

impl TableFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_none() && self.mandal.is_none()
    }

    #[must_use]
    pub fn matches(&self, point: &PointRecord) -> bool {
        self.matches_lowered(&self.search.to_lowercase(), point)
    }

    /// `needle` is the search term, already lowercased.
    fn matches_lowered(&self, needle: &str, point: &PointRecord) -> bool {
        let search_ok = needle.is_empty()
            || point.code.to_lowercase().contains(needle)
            || point.name.to_lowercase().contains(needle);

        search_ok
            && self.status.is_none_or(|s| point.status == s)
            && self
                .mandal
                .as_deref()
                .is_none_or(|m| point.mandal_name == m)
    }

    /// Filters `points`, keeping source order.
    pub fn apply<'a>(
        &self,
        points: impl IntoIterator<Item = &'a PointRecord>,
    ) -> Vec<&'a PointRecord> {
        let needle = self.search.to_lowercase();
        points
            .into_iter()
            .filter(|p| self.matches_lowered(&needle, p))
            .collect()
    }
}

/// Number of pages for `count` rows. Zero rows is zero pages.
#[must_use]
pub const fn page_count(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Rows of 1-based `page`. Out-of-range pages are empty.
#[must_use]
pub fn page_slice<T>(rows: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(rows.len());
    &rows[start..end]
}

/// Selected district, table filters, and current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    district: Option<District>,
    filter: TableFilter,
    page: usize,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            district: None,
            filter: TableFilter::default(),
            page: 1,
        }
    }
}

impl SelectionState {
    #[must_use]
    pub const fn district(&self) -> Option<&District> {
        self.district.as_ref()
    }

    #[must_use]
    pub const fn filter(&self) -> &TableFilter {
        &self.filter
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Selects a district (or all districts). Filters and page reset.
    pub fn set_district(&mut self, district: Option<District>) {
        self.district = district;
        self.filter = TableFilter::default();
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<PointStatus>) {
        self.filter.status = status;
        self.page = 1;
    }

    pub fn set_mandal(&mut self, mandal: Option<String>) {
        self.filter.mandal = mandal.filter(|m| !m.is_empty());
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter = TableFilter::default();
        self.page = 1;
    }

    /// Moves to the next page if one exists for `filtered_count` rows.
    /// Returns whether the page changed.
    pub const fn next_page(&mut self, filtered_count: usize) -> bool {
        if self.page < page_count(filtered_count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous page unless already on the first.
    pub const fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `page`, clamped to the valid range for `filtered_count`
    /// rows.
    pub fn go_to_page(&mut self, page: usize, filtered_count: usize) {
        self.page = page.clamp(1, page_count(filtered_count).max(1));
    }

    /// Back to no district, no filters, page 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
