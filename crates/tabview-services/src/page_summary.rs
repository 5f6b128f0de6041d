use tabview_core::Page;

/// Position of the loaded page within the table, for the pager footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub begin: usize,
    pub end: usize,
    pub limit: usize,
    /// Unfiltered table size, when it has been counted
    pub total: Option<u64>,
}

impl PageSummary {
    pub fn new(page: &Page, total: Option<u64>) -> Self {
        Self {
            begin: page.offset,
            end: page.offset + page.row_count(),
            limit: page.limit,
            total,
        }
    }

    /// A full page must fit before `begin`, as it must for `prev_page`
    pub fn has_previous(&self) -> bool {
        self.limit > 0 && self.begin >= self.limit
    }

    /// Unknown totals always allow moving on
    pub fn has_next(&self) -> bool {
        match self.total {
            Some(total) => self.end as u64 != total,
            None => true,
        }
    }
}

impl std::fmt::Display for PageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.total {
            Some(total) => write!(f, "Rows {} - {} of {}", self.begin, self.end, total),
            None => write!(f, "Rows {} - {} of ...", self.begin, self.end),
        }
    }
}
